#![allow(dead_code)]

use alloy_primitives::{address, Address, Bytes, U256};
use k256::ecdsa::SigningKey;
use lsp6_key_manager::{
    types::{
        encode_allowed_calls, encode_allowed_data_keys,
        keys::{allowed_calls_key, allowed_data_keys_key, permissions_key},
        AllowedCall, AllowedDataKey, PermissionSet,
    },
    KeyManager, MemoryAccount, MemoryChain,
};
use lsp6_relay_encoder::{nonce_word, sign_relay_call, signer_address, RelayCall, SignedRelayCall};
use tracing_subscriber::EnvFilter;

pub const CHAIN_ID: u64 = 4201;
pub const KM: Address = address!("4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b");
pub const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");
pub const BOB: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");
pub const TARGET: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn key_manager() -> KeyManager<MemoryAccount, MemoryChain> {
    init_tracing();
    KeyManager::new(KM, MemoryAccount::new(ACCOUNT, KM), MemoryChain::new(CHAIN_ID))
}

pub fn grant(account: &MemoryAccount, controller: Address, permissions: PermissionSet) {
    account.seed_data(permissions_key(controller), permissions.to_word().to_vec());
}

pub fn allow_calls(account: &MemoryAccount, controller: Address, calls: &[AllowedCall]) {
    account.seed_data(allowed_calls_key(controller), encode_allowed_calls(calls));
}

pub fn allow_data_keys(account: &MemoryAccount, controller: Address, prefixes: &[&[u8]]) {
    let keys: Vec<AllowedDataKey> = prefixes
        .iter()
        .map(|p| AllowedDataKey::new(Bytes::copy_from_slice(p)).unwrap())
        .collect();
    account.seed_data(allowed_data_keys_key(controller), encode_allowed_data_keys(&keys).unwrap());
}

pub fn signer(seed: u8) -> (SigningKey, Address) {
    let key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let address = signer_address(&key);
    (key, address)
}

pub fn signed(
    key: &SigningKey,
    channel: u128,
    sequence: u128,
    validity_timestamps: U256,
    payload: Vec<u8>,
) -> SignedRelayCall {
    let call = RelayCall {
        chain_id: CHAIN_ID,
        account: ACCOUNT,
        nonce: nonce_word(channel, sequence),
        validity_timestamps,
        value: U256::ZERO,
        payload,
    };
    sign_relay_call(call, key).unwrap()
}
