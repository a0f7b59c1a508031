//! LSP6 key manager engine.
//!
//! Sits in front of an ERC725 account and decides, from the permissions stored in the
//! account itself, whether a controller may run a given account call. Calls arrive either
//! directly from the controller or as LSP25 relay calls signed off-chain.
//!
//! The engine is host-agnostic: the account and the chain are reached through the
//! [`Account`] and [`ChainContext`] traits. [`MemoryAccount`] and [`MemoryChain`] back them
//! in memory.

pub mod account;
mod authorizer;
pub mod constants;
pub mod context;
pub mod decoder;
pub mod errors;
pub mod interfaces;
mod key_manager;
pub mod nonce;
mod reentrancy;
pub mod registry;
pub mod relay;
pub mod utils;

pub use account::{Account, CallHandler, IncomingCall, MemoryAccount, OwnershipEvent, RenounceConfig};
pub use authorizer::CallAuthorizer;
pub use context::{ChainContext, MemoryChain};
pub use decoder::{AccountCall, Execution};
pub use errors::{AccountError, KeyManagerError, OwnershipError, RelayError};
pub use key_manager::{KeyManager, PermissionsVerified};
pub use nonce::NonceManager;
pub use reentrancy::{ReentrancyGuard, ReentrancyToken};
pub use registry::PermissionRegistry;
pub use relay::{RelayCallVerifier, RelayRequest};

pub use lsp6_permission_types as types;
