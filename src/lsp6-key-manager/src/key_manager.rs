//! The key manager: entry point for every privileged interaction with the account.
//!
//! A request is decoded, checked for reentrancy, authorised against the caller's (or the
//! relay signer's) permissions and only then forwarded. A failure at any step leaves the
//! account, the event log and, except for reverted relay calls, the nonces untouched.

use std::cell::RefCell;

use alloy_primitives::{Address, Bytes, FixedBytes, LogData, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolInterface};
use lsp6_permission_types::{
    abi::{ILSP0, ILSP6},
    PermissionSet,
};
use tracing::{debug, warn};

use crate::{
    account::Account,
    authorizer::{require, CallAuthorizer},
    constants::{ERC1271_FAILURE_VALUE, ERC1271_SUCCESS_VALUE},
    context::ChainContext,
    decoder::{decode_account_call, payload_selector, AccountCall},
    errors::{AccountError, KeyManagerError},
    nonce::NonceManager,
    reentrancy::ReentrancyGuard,
    registry::PermissionRegistry,
    relay::{RelayCallVerifier, RelayRequest},
    utils::crypto::recover_signer,
};

/// Emitted once per request that passed verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionsVerified {
    pub signer: Address,
    pub value: U256,
    pub selector: FixedBytes<4>,
}

impl PermissionsVerified {
    /// Topics and data as the contract would log them.
    pub fn to_log_data(&self) -> LogData {
        ILSP6::PermissionsVerified {
            signer: self.signer,
            value: self.value,
            selector: self.selector,
        }
        .encode_log_data()
    }
}

/// Who is asking, once the relay signature (if any) has been resolved.
#[derive(Clone, Copy, Debug)]
enum Origin {
    Direct,
    /// Signed request; the nonce is consumed once the signer is authorised.
    Relayed { nonce: U256 },
}

pub struct KeyManager<A, C> {
    address: Address,
    account: A,
    chain: C,
    nonces: NonceManager,
    guard: ReentrancyGuard,
    events: RefCell<Vec<PermissionsVerified>>,
}

impl<A: Account, C: ChainContext> KeyManager<A, C> {
    /// `address` is where the key manager itself lives; the account must not be told to call it.
    pub fn new(address: Address, account: A, chain: C) -> Self {
        Self {
            address,
            account,
            chain,
            nonces: NonceManager::new(),
            guard: ReentrancyGuard::new(),
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn account(&self) -> &A {
        &self.account
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn registry(&self) -> PermissionRegistry<'_, A> {
        PermissionRegistry::new(&self.account)
    }

    pub fn events(&self) -> Vec<PermissionsVerified> {
        self.events.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<PermissionsVerified> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Next relay nonce of `from` on `channel`.
    pub fn get_nonce(&self, from: Address, channel: u128) -> U256 {
        self.nonces.get_nonce(from, channel)
    }

    /// `caller` runs `payload` on the account, sending `msg_value` along.
    pub fn execute(
        &self,
        caller: Address,
        msg_value: U256,
        payload: &[u8],
    ) -> Result<Bytes, KeyManagerError> {
        self.dispatch(caller, Origin::Direct, msg_value, payload)
    }

    /// Run `payload` on behalf of whoever signed it.
    ///
    /// Once the signer is authorised the nonce stays consumed, even if the account call
    /// then reverts.
    pub fn execute_relay_call(
        &self,
        msg_value: U256,
        signature: &[u8],
        nonce: U256,
        validity_timestamps: U256,
        payload: &[u8],
    ) -> Result<Bytes, KeyManagerError> {
        let request = RelayRequest {
            signature,
            nonce,
            validity_timestamps,
            value: msg_value,
            payload,
        };
        let signer = RelayCallVerifier::new(self.account.address(), &self.chain, &self.nonces)
            .verify(&request)?;
        self.dispatch(signer, Origin::Relayed { nonce }, msg_value, payload)
    }

    pub fn execute_batch(
        &self,
        caller: Address,
        msg_value: U256,
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, KeyManagerError> {
        if values.len() != payloads.len() {
            return Err(KeyManagerError::BatchExecuteParamsLengthMismatch);
        }
        check_batch_value(values, msg_value)?;
        self.run_batch(payloads.len(), |i| self.execute(caller, values[i], &payloads[i]))
    }

    pub fn execute_relay_call_batch(
        &self,
        msg_value: U256,
        signatures: &[Bytes],
        nonces: &[U256],
        validity_timestamps: &[U256],
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, KeyManagerError> {
        let len = signatures.len();
        if nonces.len() != len
            || validity_timestamps.len() != len
            || values.len() != len
            || payloads.len() != len
        {
            return Err(KeyManagerError::BatchExecuteParamsLengthMismatch);
        }
        check_batch_value(values, msg_value)?;
        self.run_batch(len, |i| {
            self.execute_relay_call(
                values[i],
                &signatures[i],
                nonces[i],
                validity_timestamps[i],
                &payloads[i],
            )
        })
    }

    /// ERC1271: valid when the key that signed `hash` holds SIGN.
    pub fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> FixedBytes<4> {
        let Ok(signer) = recover_signer(hash, signature) else {
            return ERC1271_FAILURE_VALUE;
        };
        if self.registry().permissions_of(signer).contains(PermissionSet::SIGN) {
            ERC1271_SUCCESS_VALUE
        } else {
            debug!(%signer, "signer lacks SIGN");
            ERC1271_FAILURE_VALUE
        }
    }

    /// Route ABI-encoded key manager calldata. Returns ABI-encoded return data.
    pub fn call(
        &self,
        caller: Address,
        msg_value: U256,
        calldata: &[u8],
    ) -> Result<Bytes, KeyManagerError> {
        let call = ILSP6::ILSP6Calls::abi_decode(calldata, true)
            .map_err(|_| KeyManagerError::InvalidPayload(Bytes::copy_from_slice(calldata)))?;
        let encoded = match call {
            ILSP6::ILSP6Calls::execute(call) => {
                let result = self.execute(caller, msg_value, &call.payload)?;
                ILSP6::executeCall::abi_encode_returns(&(result,))
            }
            ILSP6::ILSP6Calls::executeBatch(call) => {
                let results = self.execute_batch(caller, msg_value, &call.values, &call.payloads)?;
                ILSP6::executeBatchCall::abi_encode_returns(&(results,))
            }
            ILSP6::ILSP6Calls::executeRelayCall(call) => {
                let result = self.execute_relay_call(
                    msg_value,
                    &call.signature,
                    call.nonce,
                    call.validityTimestamps,
                    &call.payload,
                )?;
                ILSP6::executeRelayCallCall::abi_encode_returns(&(result,))
            }
            ILSP6::ILSP6Calls::executeRelayCallBatch(call) => {
                let results = self.execute_relay_call_batch(
                    msg_value,
                    &call.signatures,
                    &call.nonces,
                    &call.validityTimestamps,
                    &call.values,
                    &call.payloads,
                )?;
                ILSP6::executeRelayCallBatchCall::abi_encode_returns(&(results,))
            }
            ILSP6::ILSP6Calls::getNonce(call) => {
                ILSP6::getNonceCall::abi_encode_returns(&(self.get_nonce(call.from, call.channelId),))
            }
            ILSP6::ILSP6Calls::isValidSignature(call) => {
                let magic = self.is_valid_signature(call.dataHash, &call.signature);
                ILSP6::isValidSignatureCall::abi_encode_returns(&(magic,))
            }
        };
        Ok(encoded.into())
    }

    fn dispatch(
        &self,
        from: Address,
        origin: Origin,
        msg_value: U256,
        payload: &[u8],
    ) -> Result<Bytes, KeyManagerError> {
        let selector = payload_selector(payload)?;
        let call = decode_account_call(payload)?;

        let token = self.guard.enter(!call.is_set_data());
        if token.is_reentrant() {
            debug!(%from, "reentrant call");
            require(from, self.registry().permissions_of(from), PermissionSet::REENTRANCY)?;
        }

        let is_relayed = matches!(origin, Origin::Relayed { .. });
        CallAuthorizer::new(self.address, &self.account, &self.chain).verify(from, is_relayed, &call)?;
        let nonces_before = self.nonces.snapshot();
        if let Origin::Relayed { nonce } = origin {
            self.nonces.use_nonce(from, nonce);
        }

        let events_before = self.events.borrow().len();
        self.events.borrow_mut().push(PermissionsVerified {
            signer: from,
            value: msg_value,
            selector,
        });
        debug!(%from, %selector, relayed = is_relayed, "forwarding to account");

        let checkpoint = self.account.checkpoint();
        match self.forward(call) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(%from, %selector, %err, "account call failed");
                self.account.rollback(checkpoint);
                self.events.borrow_mut().truncate(events_before);
                // Nested relay calls are undone; this request's own nonce stays spent.
                self.nonces.restore(nonces_before);
                if let Origin::Relayed { nonce } = origin {
                    self.nonces.use_nonce(from, nonce);
                }
                Err(err.into())
            }
        }
    }

    fn forward(&self, call: AccountCall) -> Result<Bytes, AccountError> {
        let returned = match call {
            AccountCall::SetData { key, value } => {
                self.account.set_data(key, value)?;
                Bytes::new()
            }
            AccountCall::SetDataBatch { entries } => {
                for (key, value) in entries {
                    self.account.set_data(key, value)?;
                }
                Bytes::new()
            }
            AccountCall::Execute(execution) => {
                let result = self.account.execute(
                    execution.operation,
                    execution.target,
                    execution.value,
                    &execution.data,
                )?;
                ILSP0::executeCall::abi_encode_returns(&(result,)).into()
            }
            AccountCall::ExecuteBatch(executions) => {
                let mut results = Vec::with_capacity(executions.len());
                for execution in executions {
                    results.push(self.account.execute(
                        execution.operation,
                        execution.target,
                        execution.value,
                        &execution.data,
                    )?);
                }
                ILSP0::executeBatchCall::abi_encode_returns(&(results,)).into()
            }
            AccountCall::TransferOwnership { new_owner } => {
                self.account.transfer_ownership(self.address, new_owner)?;
                Bytes::new()
            }
            AccountCall::AcceptOwnership => {
                self.account.accept_ownership(self.address)?;
                Bytes::new()
            }
            AccountCall::RenounceOwnership => {
                self.account.renounce_ownership(self.address, self.chain.block_number())?;
                Bytes::new()
            }
        };
        Ok(returned)
    }

    // All or nothing: the first failing element undoes the ones before it.
    fn run_batch(
        &self,
        len: usize,
        mut run: impl FnMut(usize) -> Result<Bytes, KeyManagerError>,
    ) -> Result<Vec<Bytes>, KeyManagerError> {
        let checkpoint = self.account.checkpoint();
        let nonces = self.nonces.snapshot();
        let events_before = self.events.borrow().len();

        let mut results = Vec::with_capacity(len);
        for index in 0..len {
            match run(index) {
                Ok(result) => results.push(result),
                Err(cause) => {
                    warn!(index, %cause, "batch element failed");
                    self.account.rollback(checkpoint);
                    self.nonces.restore(nonces);
                    self.events.borrow_mut().truncate(events_before);
                    return Err(KeyManagerError::BatchCallFailed {
                        index,
                        cause: Box::new(cause),
                    });
                }
            }
        }
        Ok(results)
    }
}

fn check_batch_value(values: &[U256], msg_value: U256) -> Result<(), KeyManagerError> {
    let total = values.iter().fold(U256::ZERO, |acc, v| acc.saturating_add(*v));
    if total > msg_value {
        return Err(KeyManagerError::BatchInsufficientValueSent { total, msg_value });
    }
    if total < msg_value {
        return Err(KeyManagerError::BatchExcessiveValueSent { total, msg_value });
    }
    Ok(())
}
