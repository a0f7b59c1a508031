//! ERC725X `execute` rules.

use alloy_primitives::{Address, FixedBytes};
use lsp6_permission_types::{
    allowed_calls::selector_of, decode_allowed_calls, AllowedCall, CallTypes, OperationType,
    PermissionSet,
};
use tracing::{trace, warn};

use super::{require, CallAuthorizer};
use crate::{
    account::Account, context::ChainContext, decoder::Execution, errors::KeyManagerError,
};

impl<A: Account, C: ChainContext> CallAuthorizer<'_, A, C> {
    pub(crate) fn verify_can_execute(
        &self,
        from: Address,
        permissions: PermissionSet,
        execution: &Execution,
    ) -> Result<(), KeyManagerError> {
        if execution.target == self.key_manager && !execution.operation.is_contract_creation() {
            return Err(KeyManagerError::CallingKeyManagerNotAllowed);
        }

        match execution.operation {
            OperationType::Create | OperationType::Create2 => {
                require(from, permissions, PermissionSet::DEPLOY)?;
                // Nothing to match a new contract against, so funding it needs the super bit.
                if !execution.value.is_zero() {
                    require(from, permissions, PermissionSet::SUPER_TRANSFERVALUE)?;
                }
                Ok(())
            }
            OperationType::Call => self.verify_can_call(from, permissions, execution),
            OperationType::StaticCall => self.verify_can_call_restricted(
                from,
                permissions,
                execution,
                PermissionSet::STATICCALL,
                CallTypes::STATICCALL,
            ),
            OperationType::DelegateCall => self.verify_can_call_restricted(
                from,
                permissions,
                execution,
                PermissionSet::DELEGATECALL,
                CallTypes::DELEGATECALL,
            ),
        }
    }

    fn verify_can_call(
        &self,
        from: Address,
        permissions: PermissionSet,
        execution: &Execution,
    ) -> Result<(), KeyManagerError> {
        let has_data = !execution.data.is_empty();
        let has_value = !execution.value.is_zero();
        let super_call = permissions.contains(PermissionSet::SUPER_CALL);
        let super_value = permissions.contains(PermissionSet::SUPER_TRANSFERVALUE);

        // An empty call still runs the target's receive/fallback code.
        let is_call = has_data || !has_value;
        if is_call && !super_call {
            require(from, permissions, PermissionSet::CALL)?;
        }
        if has_value && !super_value {
            require(from, permissions, PermissionSet::TRANSFERVALUE)?;
        }

        if (super_call && !has_value) || (super_value && !has_data) || (super_call && super_value) {
            trace!(%from, "allowed calls skipped by super permission");
            return Ok(());
        }

        let mut required = CallTypes::empty();
        if has_value {
            required |= CallTypes::VALUE;
        }
        if is_call {
            required |= CallTypes::CALL;
        }
        self.verify_allowed_call(from, execution, required)
    }

    fn verify_can_call_restricted(
        &self,
        from: Address,
        permissions: PermissionSet,
        execution: &Execution,
        base: PermissionSet,
        call_type: CallTypes,
    ) -> Result<(), KeyManagerError> {
        if base.super_of().is_some_and(|super_bit| permissions.contains(super_bit)) {
            return Ok(());
        }
        require(from, permissions, base)?;
        self.verify_allowed_call(from, execution, call_type)
    }

    fn verify_allowed_call(
        &self,
        from: Address,
        execution: &Execution,
        required: CallTypes,
    ) -> Result<(), KeyManagerError> {
        let encoded = self.registry.allowed_calls_of(from);
        let allowed = decode_allowed_calls(&encoded).map_err(|reason| {
            warn!(%from, %reason, "malformed allowed calls");
            KeyManagerError::InvalidEncodedAllowedCalls {
                value: encoded.clone(),
                reason,
            }
        })?;
        if allowed.is_empty() {
            warn!(%from, "no allowed calls");
            return Err(KeyManagerError::NoCallsAllowed { from });
        }

        let selector = selector_of(&execution.data);
        for entry in &allowed {
            if entry.is_unrestricted() {
                warn!(%from, "allowed call whitelists everything");
                return Err(KeyManagerError::InvalidWhitelistedCall { from });
            }
            if self.matches(entry, execution.target, selector, required) {
                trace!(%from, target = %entry.address, function = %entry.function, "allowed call matched");
                return Ok(());
            }
        }

        warn!(%from, to = %execution.target, %selector, "call not allowed");
        Err(KeyManagerError::NotAllowedCall {
            from,
            to: execution.target,
            selector,
        })
    }

    // Standard last: it is the only check that asks the chain.
    fn matches(
        &self,
        entry: &AllowedCall,
        target: Address,
        selector: FixedBytes<4>,
        required: CallTypes,
    ) -> bool {
        entry.allows_call_types(required)
            && entry.allows_address(target)
            && entry.allows_function(selector)
            && (entry.is_any_standard() || self.chain.supports_interface(target, entry.standard))
    }
}
