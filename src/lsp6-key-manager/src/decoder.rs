//! Account calldata decoding at the key manager boundary.
//!
//! A payload is decoded exactly once into an [`AccountCall`]; everything downstream matches
//! on the variant instead of re-reading selectors.

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::SolInterface;
use lsp6_permission_types::{abi::ILSP0::ILSP0Calls, OperationType};
use tracing::trace;

use crate::errors::KeyManagerError;

/// One `execute` operation, with its operation type already validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub operation: OperationType,
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

/// A privileged account function, decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountCall {
    SetData { key: B256, value: Bytes },
    SetDataBatch { entries: Vec<(B256, Bytes)> },
    Execute(Execution),
    ExecuteBatch(Vec<Execution>),
    TransferOwnership { new_owner: Address },
    AcceptOwnership,
    RenounceOwnership,
}

impl AccountCall {
    /// `setData` and `setDataBatch` do not take the reentrancy lock.
    pub fn is_set_data(&self) -> bool {
        matches!(self, Self::SetData { .. } | Self::SetDataBatch { .. })
    }
}

/// First four bytes of a payload.
pub fn payload_selector(payload: &[u8]) -> Result<FixedBytes<4>, KeyManagerError> {
    if payload.len() < 4 {
        return Err(KeyManagerError::InvalidPayload(Bytes::copy_from_slice(payload)));
    }
    Ok(FixedBytes::from_slice(&payload[..4]))
}

/// Decode account calldata.
pub fn decode_account_call(payload: &[u8]) -> Result<AccountCall, KeyManagerError> {
    let selector = payload_selector(payload)?;
    if !ILSP0Calls::valid_selector(selector.0) {
        return Err(KeyManagerError::InvalidERC725Function(selector));
    }
    let call = ILSP0Calls::abi_decode(payload, true)
        .map_err(|_| KeyManagerError::InvalidPayload(Bytes::copy_from_slice(payload)))?;
    trace!(%selector, "decoded account call");

    let decoded = match call {
        ILSP0Calls::setData(call) => AccountCall::SetData {
            key: call.dataKey,
            value: call.dataValue,
        },
        ILSP0Calls::setDataBatch(call) => {
            if call.dataKeys.len() != call.dataValues.len() {
                return Err(KeyManagerError::DataKeysValuesLengthMismatch);
            }
            if call.dataKeys.is_empty() {
                return Err(KeyManagerError::DataKeysValuesEmptyArray);
            }
            AccountCall::SetDataBatch {
                entries: call.dataKeys.into_iter().zip(call.dataValues).collect(),
            }
        }
        ILSP0Calls::execute(call) => AccountCall::Execute(Execution {
            operation: operation_type(selector, call.operationType)?,
            target: call.target,
            value: call.value,
            data: call.data,
        }),
        ILSP0Calls::executeBatch(call) => {
            let len = call.operationsType.len();
            if call.targets.len() != len || call.values.len() != len || call.datas.len() != len {
                return Err(KeyManagerError::ExecuteParametersLengthMismatch);
            }
            if len == 0 {
                return Err(KeyManagerError::ExecuteParametersEmptyArray);
            }
            let mut executions = Vec::with_capacity(len);
            for (((operation, target), value), data) in call
                .operationsType
                .into_iter()
                .zip(call.targets)
                .zip(call.values)
                .zip(call.datas)
            {
                executions.push(Execution {
                    operation: operation_type(selector, operation)?,
                    target,
                    value,
                    data,
                });
            }
            AccountCall::ExecuteBatch(executions)
        }
        ILSP0Calls::transferOwnership(call) => AccountCall::TransferOwnership {
            new_owner: call.newOwner,
        },
        ILSP0Calls::acceptOwnership(_) => AccountCall::AcceptOwnership,
        ILSP0Calls::renounceOwnership(_) => AccountCall::RenounceOwnership,
    };
    Ok(decoded)
}

// Unknown operation types are rejected like an unknown function.
fn operation_type(selector: FixedBytes<4>, raw: U256) -> Result<OperationType, KeyManagerError> {
    OperationType::try_from(raw).map_err(|_| KeyManagerError::InvalidERC725Function(selector))
}
