//! Signer recovery for relay calls and ERC1271 checks.

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::constants::SIGNATURE_LEN;

/// Recover the address that produced `sig` (`r ‖ s ‖ v`) over a 32-byte digest.
///
/// `v` may be given as `{0,1}` or `{27,28}`. Anything else, a malformed `r`/`s` or a point
/// that does not recover is rejected.
pub fn recover_signer(digest: B256, sig: &[u8]) -> Result<Address, ()> {
    if sig.len() != SIGNATURE_LEN {
        return Err(());
    }
    let recovery_id = match sig[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        _ => return Err(()),
    };
    let recovery_id = RecoveryId::from_byte(recovery_id).ok_or(())?;
    let signature = Signature::from_slice(&sig[..64]).map_err(|_| ())?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
        .map_err(|_| ())?;

    let point = key.to_encoded_point(false);
    // Uncompressed SEC1: 0x04 ‖ x ‖ y.
    Ok(Address::from_raw_public_key(&point.as_bytes()[1..]))
}
