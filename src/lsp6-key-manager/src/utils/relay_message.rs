//! LSP25 relay-call message and digest construction.
//!
//! The signer commits to the whole execution context: which chain, which nonce channel and
//! sequence, when the call may run, the value attached, and the exact account payload. The
//! digest binds the message to one validator (the controlled account) so a signature cannot
//! be replayed against another account behind another key manager.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::constants::LSP25_VERSION;

/// `u256(25) ‖ u256(chainId) ‖ u256(nonce) ‖ u256(validityTimestamps) ‖ u256(value) ‖ payload`
pub fn lsp25_message(
    chain_id: u64,
    nonce: U256,
    validity_timestamps: U256,
    value: U256,
    payload: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 * 5 + payload.len());
    buf.extend_from_slice(&U256::from(LSP25_VERSION).to_be_bytes::<32>());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    buf.extend_from_slice(&validity_timestamps.to_be_bytes::<32>());
    buf.extend_from_slice(&value.to_be_bytes::<32>());
    buf.extend_from_slice(payload);
    buf
}

/// EIP-191 version 0 ("intended validator") digest:
/// `keccak256(0x19 ‖ 0x00 ‖ validator ‖ message)`.
pub fn intended_validator_digest(validator: Address, message: &[u8]) -> B256 {
    let mut buf = Vec::with_capacity(2 + 20 + message.len());
    buf.extend_from_slice(&[0x19, 0x00]);
    buf.extend_from_slice(validator.as_slice());
    buf.extend_from_slice(message);
    keccak256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    #[test]
    fn message_layout() {
        let message = lsp25_message(
            4201,
            U256::from(5u64),
            U256::ZERO,
            U256::from(1u64),
            &hex!("44c028fe"),
        );
        assert_eq!(message.len(), 32 * 5 + 4);
        assert_eq!(message[31], 25);
        assert_eq!(&message[62..64], &4201u16.to_be_bytes());
        assert_eq!(message[95], 5);
        assert_eq!(message[159], 1);
        assert_eq!(&message[160..], &hex!("44c028fe"));
    }

    #[test]
    fn digest_is_bound_to_the_validator() {
        let message = lsp25_message(1, U256::ZERO, U256::ZERO, U256::ZERO, &[]);
        let a = intended_validator_digest(address!("1111111111111111111111111111111111111111"), &message);
        let b = intended_validator_digest(address!("2222222222222222222222222222222222222222"), &message);
        assert_ne!(a, b);
    }
}
