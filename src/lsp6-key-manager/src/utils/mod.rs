//! Small deterministic helpers shared by the relay and nonce paths.

pub mod bytes;
pub mod crypto;
pub mod relay_message;
