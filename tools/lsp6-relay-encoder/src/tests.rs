#[cfg(test)]
mod tests {
    use crate::encoder::{
        execute_relay_call_calldata, relay_digest, relay_message, set_data_payload, sign_relay_call,
        signer_address,
    };
    use crate::types::{nonce_word, validity_window, RelayCall};
    use alloy_primitives::{address, hex, Address, FixedBytes, U256};
    use alloy_sol_types::SolCall;
    use k256::ecdsa::SigningKey;
    use lsp6_permission_types::abi::ILSP6;

    const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");

    fn relay_call(payload: Vec<u8>) -> RelayCall {
        RelayCall {
            chain_id: 4201,
            account: ACCOUNT,
            nonce: nonce_word(0, 5),
            validity_timestamps: U256::ZERO,
            value: U256::ZERO,
            payload,
        }
    }

    #[test]
    fn test_relay_message_layout() {
        let call = relay_call(hex!("44c028fe").to_vec());
        let message = relay_message(&call);
        assert_eq!(message.len(), 32 * 5 + 4);
        assert_eq!(message[31], 25);
        assert_eq!(message[95], 5);
        assert_eq!(&message[160..], &hex!("44c028fe"));
    }

    #[test]
    fn test_packed_words() {
        assert_eq!(nonce_word(1, 2), (U256::from(1u64) << 128) + U256::from(2u64));
        assert_eq!(validity_window(0, 0), U256::ZERO);
    }

    #[test]
    fn test_known_signer_address() {
        // Private key 1 controls the generator point's address.
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = SigningKey::from_slice(&secret).unwrap();
        assert_eq!(signer_address(&key), address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
    }

    #[test]
    fn test_signature_shape() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let signed = sign_relay_call(relay_call(Vec::new()), &key).unwrap();
        assert_eq!(signed.signature.len(), 65);
        assert!(matches!(signed.signature[64], 27 | 28));
    }

    #[test]
    fn test_digest_commits_to_every_field() {
        let base = relay_call(set_data_payload(FixedBytes::ZERO, &[1]));
        let digest = relay_digest(&base);

        let mut other = base.clone();
        other.account = Address::ZERO;
        assert_ne!(relay_digest(&other), digest);

        let mut other = base.clone();
        other.chain_id = 1;
        assert_ne!(relay_digest(&other), digest);

        let mut other = base;
        other.value = U256::from(1u64);
        assert_ne!(relay_digest(&other), digest);
    }

    #[test]
    fn test_relay_calldata_decodes() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let signed = sign_relay_call(relay_call(hex!("44c028fe").to_vec()), &key).unwrap();
        let calldata = execute_relay_call_calldata(&signed);
        let decoded = ILSP6::executeRelayCallCall::abi_decode(&calldata, true).unwrap();
        assert_eq!(decoded.nonce, nonce_word(0, 5));
        assert_eq!(&decoded.signature[..], signed.signature.as_slice());
        assert_eq!(&decoded.payload[..], &hex!("44c028fe")[..]);
    }
}
