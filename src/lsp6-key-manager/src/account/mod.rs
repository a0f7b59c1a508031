//! The programmable account sitting behind the key manager.
//!
//! The engine only ever talks to it through [`Account`]. Methods take `&self`: a forwarded
//! call may come back into the key manager before it returns, and the account must stay
//! usable while that happens.

mod memory;
mod ownership;

pub use memory::MemoryAccount;
pub use ownership::{Ownership, OwnershipEvent, RenounceConfig};

use std::rc::Rc;

use alloy_primitives::{Address, Bytes, B256, U256};
use lsp6_permission_types::OperationType;

use crate::errors::AccountError;

/// ERC725 account as seen by its key manager.
pub trait Account {
    /// Opaque snapshot used to undo a failed request.
    type Checkpoint;

    fn address(&self) -> Address;

    fn owner(&self) -> Address;

    /// Empty bytes for an unset key.
    fn get_data(&self, key: B256) -> Bytes;

    fn set_data(&self, key: B256, value: Bytes) -> Result<(), AccountError>;

    /// ERC725X `execute`. Contract creation returns the packed new address.
    fn execute(
        &self,
        operation: OperationType,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, AccountError>;

    fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), AccountError>;

    fn accept_ownership(&self, caller: Address) -> Result<(), AccountError>;

    fn renounce_ownership(&self, caller: Address, block_number: u64) -> Result<(), AccountError>;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&self, checkpoint: Self::Checkpoint);
}

impl<T: Account + ?Sized> Account for Rc<T> {
    type Checkpoint = T::Checkpoint;

    fn address(&self) -> Address {
        (**self).address()
    }

    fn owner(&self) -> Address {
        (**self).owner()
    }

    fn get_data(&self, key: B256) -> Bytes {
        (**self).get_data(key)
    }

    fn set_data(&self, key: B256, value: Bytes) -> Result<(), AccountError> {
        (**self).set_data(key, value)
    }

    fn execute(
        &self,
        operation: OperationType,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, AccountError> {
        (**self).execute(operation, target, value, data)
    }

    fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), AccountError> {
        (**self).transfer_ownership(caller, new_owner)
    }

    fn accept_ownership(&self, caller: Address) -> Result<(), AccountError> {
        (**self).accept_ownership(caller)
    }

    fn renounce_ownership(&self, caller: Address, block_number: u64) -> Result<(), AccountError> {
        (**self).renounce_ownership(caller, block_number)
    }

    fn checkpoint(&self) -> Self::Checkpoint {
        (**self).checkpoint()
    }

    fn rollback(&self, checkpoint: Self::Checkpoint) {
        (**self).rollback(checkpoint)
    }
}

/// A call leaving the account, as the callee sees it.
#[derive(Clone, Copy, Debug)]
pub struct IncomingCall<'a> {
    pub operation: OperationType,
    /// The account making the call.
    pub caller: Address,
    pub target: Address,
    pub value: U256,
    pub data: &'a [u8],
}

/// Code living at an address the account can call. `Err` carries revert data.
pub trait CallHandler {
    fn handle(&self, call: &IncomingCall<'_>) -> Result<Bytes, Bytes>;
}

impl<F> CallHandler for F
where
    F: Fn(&IncomingCall<'_>) -> Result<Bytes, Bytes>,
{
    fn handle(&self, call: &IncomingCall<'_>) -> Result<Bytes, Bytes> {
        self(call)
    }
}
