//! Read side of the permission namespace in the account's key-value store.

use alloy_primitives::{Address, Bytes};
use lsp6_permission_types::{
    keys::{allowed_calls_key, allowed_data_keys_key, permissions_key},
    PermissionSet,
};

use crate::account::Account;

/// Reads a controller's permission word and raw allow-lists.
///
/// Never decodes the allow-lists itself: callers need to tell a malformed list apart from an
/// empty one.
pub struct PermissionRegistry<'a, A> {
    account: &'a A,
}

impl<'a, A: Account> PermissionRegistry<'a, A> {
    pub fn new(account: &'a A) -> Self {
        Self { account }
    }

    /// Zero when unset. Stored values of the wrong width are padded or cut, not rejected.
    pub fn permissions_of(&self, controller: Address) -> PermissionSet {
        PermissionSet::from_stored_value(&self.account.get_data(permissions_key(controller)))
    }

    pub fn allowed_calls_of(&self, controller: Address) -> Bytes {
        self.account.get_data(allowed_calls_key(controller))
    }

    pub fn allowed_data_keys_of(&self, controller: Address) -> Bytes {
        self.account.get_data(allowed_data_keys_key(controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::MemoryAccount;
    use alloy_primitives::address;

    const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");
    const BOB: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");

    #[test]
    fn unset_controller_has_nothing() {
        let account = MemoryAccount::new(ACCOUNT, Address::ZERO);
        let registry = PermissionRegistry::new(&account);
        assert!(registry.permissions_of(BOB).is_empty());
        assert!(registry.allowed_calls_of(BOB).is_empty());
        assert!(registry.allowed_data_keys_of(BOB).is_empty());
    }

    #[test]
    fn short_permission_value_is_left_padded() {
        let account = MemoryAccount::new(ACCOUNT, Address::ZERO);
        account.seed_data(permissions_key(BOB), vec![0x04, 0x00, 0x00]);
        let registry = PermissionRegistry::new(&account);
        assert_eq!(registry.permissions_of(BOB), PermissionSet::SETDATA);
    }
}
