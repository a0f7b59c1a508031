use alloy_primitives::{Address, U256};

/// LSP25 relay call as the signer sees it, before signing.
#[derive(Clone, Debug)]
pub struct RelayCall {
    /// Chain the call is valid on.
    pub chain_id: u64,
    /// Account behind the key manager; the signature is bound to it.
    pub account: Address,
    /// `channel (u128) ‖ sequence (u128)`.
    pub nonce: U256,
    /// `start (u128) ‖ end (u128)`, zero for no restriction.
    pub validity_timestamps: U256,
    /// Value the relayer must attach.
    pub value: U256,
    /// Account calldata (`setData`, `execute`, ...).
    pub payload: Vec<u8>,
}

/// A relay call plus its 65-byte `r ‖ s ‖ v` signature.
#[derive(Clone, Debug)]
pub struct SignedRelayCall {
    pub call: RelayCall,
    pub signature: Vec<u8>,
}

/// Pack a nonce word.
pub fn nonce_word(channel: u128, sequence: u128) -> U256 {
    (U256::from(channel) << 128) | U256::from(sequence)
}

/// Pack a validity window. `end == 0` leaves it open-ended.
pub fn validity_window(start: u128, end: u128) -> U256 {
    (U256::from(start) << 128) | U256::from(end)
}
