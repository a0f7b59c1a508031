//! Host chain facts the engine reads but never mutates.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    rc::Rc,
};

use alloy_primitives::{Address, FixedBytes};

/// Chain view, implemented differently by each host.
pub trait ChainContext {
    fn chain_id(&self) -> u64;

    fn block_number(&self) -> u64;

    /// Seconds since the unix epoch.
    fn block_timestamp(&self) -> u64;

    /// ERC165 `supportsInterface(interfaceId)` on `target`. Non-contracts answer `false`.
    fn supports_interface(&self, target: Address, interface_id: FixedBytes<4>) -> bool;
}

impl<T: ChainContext + ?Sized> ChainContext for &T {
    fn chain_id(&self) -> u64 {
        (**self).chain_id()
    }

    fn block_number(&self) -> u64 {
        (**self).block_number()
    }

    fn block_timestamp(&self) -> u64 {
        (**self).block_timestamp()
    }

    fn supports_interface(&self, target: Address, interface_id: FixedBytes<4>) -> bool {
        (**self).supports_interface(target, interface_id)
    }
}

impl<T: ChainContext + ?Sized> ChainContext for Rc<T> {
    fn chain_id(&self) -> u64 {
        (**self).chain_id()
    }

    fn block_number(&self) -> u64 {
        (**self).block_number()
    }

    fn block_timestamp(&self) -> u64 {
        (**self).block_timestamp()
    }

    fn supports_interface(&self, target: Address, interface_id: FixedBytes<4>) -> bool {
        (**self).supports_interface(target, interface_id)
    }
}

/// In-memory chain whose clock is moved by hand.
#[derive(Debug, Default)]
pub struct MemoryChain {
    chain_id: u64,
    block_number: Cell<u64>,
    timestamp: Cell<u64>,
    interfaces: RefCell<HashSet<(Address, FixedBytes<4>)>>,
}

impl MemoryChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    pub fn with_block(self, number: u64, timestamp: u64) -> Self {
        self.block_number.set(number);
        self.timestamp.set(timestamp);
        self
    }

    pub fn set_block_number(&self, number: u64) {
        self.block_number.set(number);
    }

    pub fn advance_blocks(&self, blocks: u64) {
        self.block_number.set(self.block_number.get().saturating_add(blocks));
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.timestamp.set(timestamp);
    }

    /// Make `target` answer `true` for `interface_id`.
    pub fn register_interface(&self, target: Address, interface_id: FixedBytes<4>) {
        self.interfaces.borrow_mut().insert((target, interface_id));
    }
}

impl ChainContext for MemoryChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn block_number(&self) -> u64 {
        self.block_number.get()
    }

    fn block_timestamp(&self) -> u64 {
        self.timestamp.get()
    }

    fn supports_interface(&self, target: Address, interface_id: FixedBytes<4>) -> bool {
        self.interfaces.borrow().contains(&(target, interface_id))
    }
}
