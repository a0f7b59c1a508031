//! Signer-side tooling for LSP6 relay calls.
//!
//! Builds account payloads, wraps them into LSP25 relay calls and signs them. Allow-list
//! encoding lives in `lsp6-permission-types` and is re-exported here for convenience.

pub mod encoder;
pub mod types;

#[cfg(test)]
mod tests;

pub use encoder::{
    execute_payload, execute_relay_call_batch_calldata, execute_relay_call_calldata, relay_digest,
    relay_message, set_data_batch_payload, set_data_payload, sign_digest, sign_relay_call,
    signer_address, transfer_ownership_payload,
};
pub use lsp6_permission_types as permission_types;
pub use types::{nonce_word, validity_window, RelayCall, SignedRelayCall};
