use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_sol_types::SolCall;
use k256::ecdsa::SigningKey;
use lsp6_permission_types::{
    abi::{ILSP0, ILSP6},
    OperationType,
};
use sha3::{Digest, Keccak256};

use crate::types::{RelayCall, SignedRelayCall};

/// LSP25 version word prefixed to every signed message.
pub const LSP25_VERSION: u64 = 25;

fn keccak256_bytes(bytes: &[u8]) -> FixedBytes<32> {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    FixedBytes(b)
}

/// Message the controller signs (must match the key manager's reconstruction).
pub fn relay_message(call: &RelayCall) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 * 5 + call.payload.len());
    buf.extend_from_slice(&U256::from(LSP25_VERSION).to_be_bytes::<32>());
    buf.extend_from_slice(&U256::from(call.chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(&call.nonce.to_be_bytes::<32>());
    buf.extend_from_slice(&call.validity_timestamps.to_be_bytes::<32>());
    buf.extend_from_slice(&call.value.to_be_bytes::<32>());
    buf.extend_from_slice(&call.payload);
    buf
}

/// EIP-191 version 0 digest with the account as intended validator.
pub fn relay_digest(call: &RelayCall) -> FixedBytes<32> {
    let message = relay_message(call);
    let mut buf = Vec::with_capacity(2 + 20 + message.len());
    buf.extend_from_slice(b"\x19\x00");
    buf.extend_from_slice(call.account.as_slice());
    buf.extend_from_slice(&message);
    keccak256_bytes(&buf)
}

/// Sign a prehashed digest. Returns `r ‖ s ‖ v` with `v ∈ {27, 28}`.
pub fn sign_digest(digest: FixedBytes<32>, signing_key: &SigningKey) -> Result<Vec<u8>, k256::ecdsa::Error> {
    let (signature, recovery_id) = signing_key.sign_prehash_recoverable(digest.as_slice())?;
    let (r, s) = signature.split_bytes();

    let mut sig_bytes = Vec::with_capacity(65);
    sig_bytes.extend_from_slice(r.as_slice());
    sig_bytes.extend_from_slice(s.as_slice());
    sig_bytes.push(27 + recovery_id.to_byte());
    Ok(sig_bytes)
}

pub fn sign_relay_call(call: RelayCall, signing_key: &SigningKey) -> Result<SignedRelayCall, k256::ecdsa::Error> {
    let signature = sign_digest(relay_digest(&call), signing_key)?;
    Ok(SignedRelayCall { call, signature })
}

/// Address controlled by `signing_key`.
pub fn signer_address(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().to_encoded_point(false);
    // Drop the 0x04 SEC1 tag; the address is the last 20 bytes of the key hash.
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// `ILSP6.executeRelayCall` calldata for the relayer to submit.
pub fn execute_relay_call_calldata(signed: &SignedRelayCall) -> Vec<u8> {
    ILSP6::executeRelayCallCall {
        signature: Bytes::copy_from_slice(&signed.signature),
        nonce: signed.call.nonce,
        validityTimestamps: signed.call.validity_timestamps,
        payload: Bytes::copy_from_slice(&signed.call.payload),
    }
    .abi_encode()
}

/// `ILSP6.executeRelayCallBatch` calldata. The relayer must attach the sum of the values.
pub fn execute_relay_call_batch_calldata(signed: &[SignedRelayCall]) -> Vec<u8> {
    ILSP6::executeRelayCallBatchCall {
        signatures: signed.iter().map(|s| Bytes::copy_from_slice(&s.signature)).collect(),
        nonces: signed.iter().map(|s| s.call.nonce).collect(),
        validityTimestamps: signed.iter().map(|s| s.call.validity_timestamps).collect(),
        values: signed.iter().map(|s| s.call.value).collect(),
        payloads: signed.iter().map(|s| Bytes::copy_from_slice(&s.call.payload)).collect(),
    }
    .abi_encode()
}

/// Account `setData` payload.
pub fn set_data_payload(key: FixedBytes<32>, value: &[u8]) -> Vec<u8> {
    ILSP0::setDataCall {
        dataKey: key,
        dataValue: Bytes::copy_from_slice(value),
    }
    .abi_encode()
}

pub fn set_data_batch_payload(entries: &[(FixedBytes<32>, Vec<u8>)]) -> Vec<u8> {
    ILSP0::setDataBatchCall {
        dataKeys: entries.iter().map(|(key, _)| *key).collect(),
        dataValues: entries.iter().map(|(_, value)| Bytes::copy_from_slice(value)).collect(),
    }
    .abi_encode()
}

/// Account `execute` payload.
pub fn execute_payload(operation: OperationType, target: Address, value: U256, data: &[u8]) -> Vec<u8> {
    ILSP0::executeCall {
        operationType: operation.into(),
        target,
        value,
        data: Bytes::copy_from_slice(data),
    }
    .abi_encode()
}

pub fn transfer_ownership_payload(new_owner: Address) -> Vec<u8> {
    ILSP0::transferOwnershipCall { newOwner: new_owner }.abi_encode()
}
