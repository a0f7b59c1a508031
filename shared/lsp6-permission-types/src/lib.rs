//! Shared LSP6 types used both by the key manager engine and by off-chain tooling.
//!
//! Everything in here is pure: the permission word algebra, the allow-list entry types,
//! the reserved data keys and the compact bytes array codecs that store allow-lists in
//! the account's key-value store. [`abi`] carries the Solidity bindings both sides encode
//! calldata with.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod abi;
pub mod allowed_calls;
pub mod compact;
pub mod data_keys;
pub mod error;
pub mod keys;
pub mod operation;
pub mod permissions;

pub use allowed_calls::{decode_allowed_calls, encode_allowed_calls, AllowedCall, CallTypes};
pub use data_keys::{decode_allowed_data_keys, encode_allowed_data_keys, AllowedDataKey};
pub use error::CodecError;
pub use operation::OperationType;
pub use permissions::PermissionSet;
