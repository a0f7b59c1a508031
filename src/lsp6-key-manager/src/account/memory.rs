use std::{cell::RefCell, collections::HashMap, rc::Rc};

use alloy_primitives::{Address, Bytes, B256, U256};
use lsp6_permission_types::OperationType;
use tracing::trace;

use super::{Account, CallHandler, IncomingCall, Ownership, OwnershipEvent, RenounceConfig};
use crate::{decoder::Execution, errors::AccountError};

#[derive(Clone, Debug)]
pub struct MemoryAccountState {
    store: HashMap<B256, Bytes>,
    ownership: Ownership,
    executed: Vec<Execution>,
    deployed: u64,
}

/// Account backed by a hash map, with pluggable code at call targets.
///
/// Calls to addresses without a registered [`CallHandler`] succeed with empty return data,
/// like calls to an externally owned address.
pub struct MemoryAccount {
    address: Address,
    state: RefCell<MemoryAccountState>,
    handlers: RefCell<HashMap<Address, Rc<dyn CallHandler>>>,
}

impl MemoryAccount {
    pub fn new(address: Address, owner: Address) -> Self {
        Self::with_config(address, owner, RenounceConfig::default())
    }

    pub fn with_config(address: Address, owner: Address, config: RenounceConfig) -> Self {
        Self {
            address,
            state: RefCell::new(MemoryAccountState {
                store: HashMap::new(),
                ownership: Ownership::new(address, owner, config),
                executed: Vec::new(),
                deployed: 0,
            }),
            handlers: RefCell::new(HashMap::new()),
        }
    }

    pub fn register_handler(&self, target: Address, handler: impl CallHandler + 'static) {
        self.handlers.borrow_mut().insert(target, Rc::new(handler));
    }

    /// Write directly, bypassing any key manager. Meant for seeding permissions.
    pub fn seed_data(&self, key: B256, value: impl Into<Bytes>) {
        self.state.borrow_mut().store.insert(key, value.into());
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.state.borrow().ownership.pending_owner()
    }

    pub fn ownership_events(&self) -> Vec<OwnershipEvent> {
        self.state.borrow().ownership.events().to_vec()
    }

    /// Every call or creation that went through `execute`, oldest first.
    pub fn executed(&self) -> Vec<Execution> {
        self.state.borrow().executed.clone()
    }

    fn create(&self, operation: OperationType, data: &[u8]) -> Result<Bytes, AccountError> {
        let mut state = self.state.borrow_mut();
        let created = match operation {
            OperationType::Create2 => {
                // ERC725X: the salt is appended to the creation code.
                if data.len() < 32 {
                    return Err(AccountError::Reverted(Bytes::new()));
                }
                let (code, salt) = data.split_at(data.len() - 32);
                self.address.create2_from_code(B256::from_slice(salt), code)
            }
            // No RLP here: plain CREATE addresses are derived from the deployment count.
            _ => self
                .address
                .create2_from_code(U256::from(state.deployed).to_be_bytes::<32>(), data),
        };
        state.deployed += 1;
        Ok(Bytes::copy_from_slice(created.as_slice()))
    }

    fn with_ownership(
        &self,
        f: impl FnOnce(&mut Ownership) -> Result<(), crate::errors::OwnershipError>,
    ) -> Result<(), AccountError> {
        f(&mut self.state.borrow_mut().ownership).map_err(AccountError::from)
    }
}

impl Account for MemoryAccount {
    type Checkpoint = MemoryAccountState;

    fn address(&self) -> Address {
        self.address
    }

    fn owner(&self) -> Address {
        self.state.borrow().ownership.owner()
    }

    fn get_data(&self, key: B256) -> Bytes {
        self.state.borrow().store.get(&key).cloned().unwrap_or_default()
    }

    fn set_data(&self, key: B256, value: Bytes) -> Result<(), AccountError> {
        trace!(%key, len = value.len(), "account setData");
        let mut state = self.state.borrow_mut();
        if value.is_empty() {
            state.store.remove(&key);
        } else {
            state.store.insert(key, value);
        }
        Ok(())
    }

    fn execute(
        &self,
        operation: OperationType,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, AccountError> {
        trace!(operation = operation.name(), %target, %value, "account execute");
        let checkpoint = self.checkpoint();
        self.state.borrow_mut().executed.push(Execution {
            operation,
            target,
            value,
            data: Bytes::copy_from_slice(data),
        });
        if operation.is_contract_creation() {
            return self.create(operation, data);
        }

        // Clone the handler out so no borrow is held while it runs; it may re-enter.
        let handler = self.handlers.borrow().get(&target).cloned();
        let Some(handler) = handler else {
            return Ok(Bytes::new());
        };
        let call = IncomingCall {
            operation,
            caller: self.address,
            target,
            value,
            data,
        };
        handler.handle(&call).map_err(|revert| {
            self.rollback(checkpoint);
            AccountError::Reverted(revert)
        })
    }

    fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), AccountError> {
        self.with_ownership(|o| o.transfer_ownership(caller, new_owner))
    }

    fn accept_ownership(&self, caller: Address) -> Result<(), AccountError> {
        self.with_ownership(|o| o.accept_ownership(caller))
    }

    fn renounce_ownership(&self, caller: Address, block_number: u64) -> Result<(), AccountError> {
        self.with_ownership(|o| o.renounce_ownership(caller, block_number))
    }

    fn checkpoint(&self) -> Self::Checkpoint {
        self.state.borrow().clone()
    }

    fn rollback(&self, checkpoint: Self::Checkpoint) {
        *self.state.borrow_mut() = checkpoint;
    }
}
