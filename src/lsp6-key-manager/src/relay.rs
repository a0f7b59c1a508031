//! LSP25 relay-call verification: who signed, is the nonce current, is the window open.
//!
//! The verifier only reads. Consuming the nonce is left to the key manager, which does it
//! once the signer's permissions have been checked.

use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, warn};

use crate::{
    context::ChainContext,
    errors::RelayError,
    nonce::NonceManager,
    utils::{
        bytes::split_word,
        crypto::recover_signer,
        relay_message::{intended_validator_digest, lsp25_message},
    },
};

/// A signed relay request as submitted by a relayer.
#[derive(Clone, Copy, Debug)]
pub struct RelayRequest<'a> {
    pub signature: &'a [u8],
    pub nonce: U256,
    /// `start (u128) ‖ end (u128)`, zero for no restriction.
    pub validity_timestamps: U256,
    /// Value the relayer attaches; part of what the signer committed to.
    pub value: U256,
    pub payload: &'a [u8],
}

pub struct RelayCallVerifier<'a, C> {
    validator: Address,
    chain: &'a C,
    nonces: &'a NonceManager,
}

impl<'a, C: ChainContext> RelayCallVerifier<'a, C> {
    /// `validator` is the account the signatures are bound to.
    pub fn new(validator: Address, chain: &'a C, nonces: &'a NonceManager) -> Self {
        Self {
            validator,
            chain,
            nonces,
        }
    }

    /// Recover the signer of `request` and check its nonce and validity window.
    pub fn verify(&self, request: &RelayRequest<'_>) -> Result<Address, RelayError> {
        let message = lsp25_message(
            self.chain.chain_id(),
            request.nonce,
            request.validity_timestamps,
            request.value,
            request.payload,
        );
        let digest = intended_validator_digest(self.validator, &message);
        let signer = recover_signer(digest, request.signature).map_err(|_| {
            warn!(%digest, "relay signature does not recover");
            RelayError::InvalidSignature
        })?;

        if !self.nonces.is_valid_nonce(signer, request.nonce) {
            let (channel, sequence) = split_word(request.nonce);
            warn!(%signer, channel, sequence, "invalid relay nonce");
            return Err(RelayError::InvalidRelayNonce {
                signer,
                nonce: request.nonce,
                signature: Bytes::copy_from_slice(request.signature),
            });
        }

        check_validity(request.validity_timestamps, self.chain.block_timestamp())?;
        debug!(%signer, nonce = %request.nonce, "relay call verified");
        Ok(signer)
    }
}

/// Check `now` against a packed `start ‖ end` window. Zero is always valid, and so is an
/// `end` of zero past `start`.
pub fn check_validity(validity_timestamps: U256, now: u64) -> Result<(), RelayError> {
    if validity_timestamps.is_zero() {
        return Ok(());
    }
    let (start, end) = split_word(validity_timestamps);
    let now = u128::from(now);
    if now < start {
        warn!(start, now, "relay call not valid yet");
        return Err(RelayError::BeforeStartTime);
    }
    if end != 0 && now > end {
        warn!(end, now, "relay call expired");
        return Err(RelayError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::MemoryChain, utils::bytes::join_word};
    use alloy_primitives::{address, hex, B256};
    use k256::ecdsa::SigningKey;

    const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");

    fn sign(key: &SigningKey, digest: B256) -> Vec<u8> {
        let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice()).unwrap();
        let mut out = signature.to_bytes().to_vec();
        out.push(27 + recovery_id.to_byte());
        out
    }

    fn address_of(key: &SigningKey) -> Address {
        let point = key.verifying_key().to_encoded_point(false);
        Address::from_raw_public_key(&point.as_bytes()[1..])
    }

    fn signed(key: &SigningKey, chain: &MemoryChain, nonce: U256, validity: U256) -> Vec<u8> {
        let message = lsp25_message(chain.chain_id(), nonce, validity, U256::ZERO, &hex!("44c028fe"));
        sign(key, intended_validator_digest(ACCOUNT, &message))
    }

    #[test]
    fn recovers_signer_for_current_nonce() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let chain = MemoryChain::new(4201);
        let nonces = NonceManager::new();
        let signature = signed(&key, &chain, U256::ZERO, U256::ZERO);

        let verifier = RelayCallVerifier::new(ACCOUNT, &chain, &nonces);
        let request = RelayRequest {
            signature: &signature,
            nonce: U256::ZERO,
            validity_timestamps: U256::ZERO,
            value: U256::ZERO,
            payload: &hex!("44c028fe"),
        };
        assert_eq!(verifier.verify(&request), Ok(address_of(&key)));

        nonces.use_nonce(address_of(&key), U256::ZERO);
        assert!(matches!(
            verifier.verify(&request),
            Err(RelayError::InvalidRelayNonce { signer, .. }) if signer == address_of(&key)
        ));
    }

    #[test]
    fn signature_for_another_chain_recovers_someone_else() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let nonces = NonceManager::new();
        // Advance the real signer so only a foreign address would see sequence zero as valid.
        nonces.use_nonce(address_of(&key), U256::ZERO);
        let signature = signed(&key, &MemoryChain::new(1), U256::ZERO, U256::ZERO);

        let chain = MemoryChain::new(4201);
        let verifier = RelayCallVerifier::new(ACCOUNT, &chain, &nonces);
        let signer = verifier
            .verify(&RelayRequest {
                signature: &signature,
                nonce: U256::ZERO,
                validity_timestamps: U256::ZERO,
                value: U256::ZERO,
                payload: &hex!("44c028fe"),
            })
            .unwrap();
        assert_ne!(signer, address_of(&key));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let chain = MemoryChain::new(1);
        let nonces = NonceManager::new();
        let verifier = RelayCallVerifier::new(ACCOUNT, &chain, &nonces);
        let request = RelayRequest {
            signature: &[0u8; 12],
            nonce: U256::ZERO,
            validity_timestamps: U256::ZERO,
            value: U256::ZERO,
            payload: &[],
        };
        assert_eq!(verifier.verify(&request), Err(RelayError::InvalidSignature));
    }

    #[test]
    fn validity_window() {
        let window = join_word(100, 200);
        assert_eq!(check_validity(window, 99), Err(RelayError::BeforeStartTime));
        assert_eq!(check_validity(window, 100), Ok(()));
        assert_eq!(check_validity(window, 200), Ok(()));
        assert_eq!(check_validity(window, 201), Err(RelayError::Expired));

        assert_eq!(check_validity(U256::ZERO, 0), Ok(()));
        assert_eq!(check_validity(join_word(100, 0), u64::MAX), Ok(()));
        assert_eq!(check_validity(join_word(0, 50), 51), Err(RelayError::Expired));
    }

    #[test]
    fn window_is_checked_after_the_nonce() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let chain = MemoryChain::new(1).with_block(10, 1_000);
        let nonces = NonceManager::new();
        let validity = join_word(0, 500);
        let signature = signed(&key, &chain, U256::ZERO, validity);
        let verifier = RelayCallVerifier::new(ACCOUNT, &chain, &nonces);
        assert_eq!(
            verifier.verify(&RelayRequest {
                signature: &signature,
                nonce: U256::ZERO,
                validity_timestamps: validity,
                value: U256::ZERO,
                payload: &hex!("44c028fe"),
            }),
            Err(RelayError::Expired)
        );
    }
}
