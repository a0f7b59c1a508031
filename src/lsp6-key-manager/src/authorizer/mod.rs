//! Allow/deny decisions for one controller and one decoded account call.
//!
//! Nothing in here writes: a request that passes is forwarded by the key manager
//! afterwards, a request that fails never reaches the account.

mod execute;
mod set_data;

use alloy_primitives::Address;
use lsp6_permission_types::PermissionSet;
use tracing::{debug, warn};

use crate::{
    account::Account, context::ChainContext, decoder::AccountCall, errors::KeyManagerError,
    registry::PermissionRegistry,
};

/// Fail with `NotAuthorised` unless every bit of `needed` is granted.
pub(crate) fn require(
    from: Address,
    granted: PermissionSet,
    needed: PermissionSet,
) -> Result<(), KeyManagerError> {
    if granted.contains(needed) {
        return Ok(());
    }
    warn!(%from, permission = needed.name().unwrap_or("UNKNOWN"), "missing permission");
    Err(KeyManagerError::not_authorised(from, needed))
}

pub struct CallAuthorizer<'a, A, C> {
    key_manager: Address,
    account: &'a A,
    chain: &'a C,
    registry: PermissionRegistry<'a, A>,
}

impl<'a, A: Account, C: ChainContext> CallAuthorizer<'a, A, C> {
    pub fn new(key_manager: Address, account: &'a A, chain: &'a C) -> Self {
        Self {
            key_manager,
            account,
            chain,
            registry: PermissionRegistry::new(account),
        }
    }

    pub fn registry(&self) -> &PermissionRegistry<'a, A> {
        &self.registry
    }

    /// Check that `from` may perform `call`.
    ///
    /// `is_relayed` adds the EXECUTE_RELAY_CALL requirement of signature-authorised calls.
    pub fn verify(
        &self,
        from: Address,
        is_relayed: bool,
        call: &AccountCall,
    ) -> Result<(), KeyManagerError> {
        let permissions = self.registry.permissions_of(from);
        if permissions.is_empty() {
            warn!(%from, "no permissions set");
            return Err(KeyManagerError::NoPermissionsSet { from });
        }
        if is_relayed {
            require(from, permissions, PermissionSet::EXECUTE_RELAY_CALL)?;
        }

        match call {
            AccountCall::SetData { key, value } => {
                self.verify_can_set_data(from, permissions, &[(*key, value.clone())])
            }
            AccountCall::SetDataBatch { entries } => {
                self.verify_can_set_data(from, permissions, entries)
            }
            AccountCall::Execute(execution) => self.verify_can_execute(from, permissions, execution),
            AccountCall::ExecuteBatch(executions) => executions
                .iter()
                .try_for_each(|execution| self.verify_can_execute(from, permissions, execution)),
            AccountCall::TransferOwnership { .. }
            | AccountCall::AcceptOwnership
            | AccountCall::RenounceOwnership => require(from, permissions, PermissionSet::CHANGEOWNER),
        }?;

        debug!(%from, ?permissions, "permissions verified");
        Ok(())
    }
}
