use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::SolError;
use lsp6_permission_types::{CodecError, PermissionSet};

use crate::interfaces::{IERC725Errors, ILSP14Errors, ILSP25Errors, ILSP6Errors};

/// LSP14 ownership failures raised by the account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("caller {0} is not the owner")]
    CallerNotTheOwner(Address),
    #[error("caller {0} is not the pending owner")]
    CallerNotPendingOwner(Address),
    #[error("cannot transfer ownership to the account itself")]
    CannotTransferOwnershipToSelf,
    #[error("renounce ownership only confirmable between blocks {start} and {end}")]
    NotInRenounceOwnershipInterval { start: u64, end: u64 },
}

/// Errors surfaced by the account when the key manager forwards a call to it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// The forwarded call reverted. The data is bubbled unchanged.
    #[error("call reverted with {0}")]
    Reverted(Bytes),
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
}

/// Relay call (LSP25) verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("relay signature does not recover to a signer")]
    InvalidSignature,
    /// `signer` is whatever the signature recovered to, which for a forged or mangled
    /// signature is an unrelated address.
    #[error("invalid relay nonce {nonce} for recovered signer {signer}")]
    InvalidRelayNonce {
        signer: Address,
        nonce: U256,
        signature: Bytes,
    },
    #[error("relay call submitted before its start time")]
    BeforeStartTime,
    #[error("relay call expired")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyManagerError {
    #[error("{from} has no permissions set")]
    NoPermissionsSet { from: Address },
    #[error("{from} is not authorised for {}", .permission.name().unwrap_or("UNKNOWN"))]
    NotAuthorised {
        from: Address,
        permission: PermissionSet,
    },

    #[error("{from} has no allowed calls")]
    NoCallsAllowed { from: Address },
    #[error("{from} is not allowed to call {selector} on {to}")]
    NotAllowedCall {
        from: Address,
        to: Address,
        selector: FixedBytes<4>,
    },
    #[error("{from} has an allowed call whitelisting every address, standard and function")]
    InvalidWhitelistedCall { from: Address },
    #[error("malformed allowed calls {value}")]
    InvalidEncodedAllowedCalls {
        value: Bytes,
        #[source]
        reason: CodecError,
    },

    #[error("{from} has no allowed data keys")]
    NoERC725YDataKeysAllowed { from: Address },
    #[error("{from} is not allowed to set data key {key}")]
    NotAllowedERC725YDataKey { from: Address, key: B256 },
    #[error("malformed allowed data keys {value}")]
    InvalidEncodedAllowedERC725YDataKeys {
        value: Bytes,
        #[source]
        reason: CodecError,
    },
    #[error("invalid value {value} for data key {key}")]
    InvalidDataValuesForDataKeys { key: B256, value: Bytes },
    #[error("unrecognised permission data key {0}")]
    NotRecognisedPermissionKey(B256),

    #[error("the key manager cannot be the target of its own calls")]
    CallingKeyManagerNotAllowed,
    #[error("invalid payload {0}")]
    InvalidPayload(Bytes),
    #[error("unknown account function {0}")]
    InvalidERC725Function(FixedBytes<4>),

    #[error("executeBatch parameter arrays have different lengths")]
    ExecuteParametersLengthMismatch,
    #[error("executeBatch called with no operations")]
    ExecuteParametersEmptyArray,
    #[error("setDataBatch keys and values have different lengths")]
    DataKeysValuesLengthMismatch,
    #[error("setDataBatch called with no keys")]
    DataKeysValuesEmptyArray,

    #[error("batch parameter arrays have different lengths")]
    BatchExecuteParamsLengthMismatch,
    #[error("batch values add up to {total} but {msg_value} was sent")]
    BatchInsufficientValueSent { total: U256, msg_value: U256 },
    #[error("batch values add up to {total} but {msg_value} was sent")]
    BatchExcessiveValueSent { total: U256, msg_value: U256 },
    #[error("batch element {index} failed: {cause}")]
    BatchCallFailed {
        index: usize,
        #[source]
        cause: Box<KeyManagerError>,
    },

    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl KeyManagerError {
    pub(crate) fn not_authorised(from: Address, permission: PermissionSet) -> Self {
        Self::NotAuthorised { from, permission }
    }

    /// The innermost error, looking through batch wrappers.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::BatchCallFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// ABI-encoded revert data, as the contract would revert with.
    ///
    /// Account reverts are returned verbatim and batch failures bubble their cause.
    pub fn revert_data(&self) -> Bytes {
        match self {
            Self::NoPermissionsSet { from } => {
                ILSP6Errors::NoPermissionsSet { from: *from }.abi_encode().into()
            }
            Self::NotAuthorised { from, permission } => ILSP6Errors::NotAuthorised {
                from: *from,
                permission: permission.name().unwrap_or("UNKNOWN").into(),
            }
            .abi_encode()
            .into(),
            Self::NoCallsAllowed { from } => {
                ILSP6Errors::NoCallsAllowed { from: *from }.abi_encode().into()
            }
            Self::NotAllowedCall { from, to, selector } => ILSP6Errors::NotAllowedCall {
                from: *from,
                to: *to,
                selector: *selector,
            }
            .abi_encode()
            .into(),
            Self::InvalidWhitelistedCall { from } => {
                ILSP6Errors::InvalidWhitelistedCall { from: *from }.abi_encode().into()
            }
            Self::InvalidEncodedAllowedCalls { value, .. } => {
                ILSP6Errors::InvalidEncodedAllowedCalls { allowedCallsValue: value.clone() }
                    .abi_encode()
                    .into()
            }
            Self::NoERC725YDataKeysAllowed { from } => {
                ILSP6Errors::NoERC725YDataKeysAllowed { from: *from }.abi_encode().into()
            }
            Self::NotAllowedERC725YDataKey { from, key } => {
                ILSP6Errors::NotAllowedERC725YDataKey { from: *from, disallowedKey: *key }
                    .abi_encode()
                    .into()
            }
            Self::InvalidEncodedAllowedERC725YDataKeys { value, .. } => {
                ILSP6Errors::InvalidEncodedAllowedERC725YDataKeys { value: value.clone() }
                    .abi_encode()
                    .into()
            }
            Self::InvalidDataValuesForDataKeys { key, value } => {
                ILSP6Errors::InvalidDataValuesForDataKeys { dataKey: *key, dataValue: value.clone() }
                    .abi_encode()
                    .into()
            }
            Self::NotRecognisedPermissionKey(key) => {
                ILSP6Errors::NotRecognisedPermissionKey { dataKey: *key }.abi_encode().into()
            }
            Self::CallingKeyManagerNotAllowed => {
                ILSP6Errors::CallingKeyManagerNotAllowed {}.abi_encode().into()
            }
            Self::InvalidPayload(payload) => {
                ILSP6Errors::InvalidPayload { payload: payload.clone() }.abi_encode().into()
            }
            Self::InvalidERC725Function(selector) => {
                ILSP6Errors::InvalidERC725Function { invalidFunction: *selector }
                    .abi_encode()
                    .into()
            }
            Self::ExecuteParametersLengthMismatch => {
                IERC725Errors::ERC725X_ExecuteParametersLengthMismatch {}.abi_encode().into()
            }
            Self::ExecuteParametersEmptyArray => {
                IERC725Errors::ERC725X_ExecuteParametersEmptyArray {}.abi_encode().into()
            }
            Self::DataKeysValuesLengthMismatch => {
                IERC725Errors::ERC725Y_DataKeysValuesLengthMismatch {}.abi_encode().into()
            }
            Self::DataKeysValuesEmptyArray => {
                IERC725Errors::ERC725Y_DataKeysValuesEmptyArray {}.abi_encode().into()
            }
            Self::BatchExecuteParamsLengthMismatch => {
                ILSP6Errors::BatchExecuteParamsLengthMismatch {}.abi_encode().into()
            }
            Self::BatchInsufficientValueSent { total, msg_value } => {
                ILSP6Errors::LSP6BatchInsufficientValueSent {
                    totalValues: *total,
                    msgValue: *msg_value,
                }
                .abi_encode()
                .into()
            }
            Self::BatchExcessiveValueSent { total, msg_value } => {
                ILSP6Errors::LSP6BatchExcessiveValueSent { totalValues: *total, msgValue: *msg_value }
                    .abi_encode()
                    .into()
            }
            Self::BatchCallFailed { cause, .. } => cause.revert_data(),
            Self::Relay(err) => err.revert_data(),
            Self::Account(err) => err.revert_data(),
        }
    }
}

impl RelayError {
    pub fn revert_data(&self) -> Bytes {
        match self {
            Self::InvalidSignature => ILSP25Errors::ECDSAInvalidSignature {}.abi_encode().into(),
            Self::InvalidRelayNonce { signer, nonce, signature } => {
                ILSP25Errors::InvalidRelayNonce {
                    signer: *signer,
                    invalidNonce: *nonce,
                    signature: signature.clone(),
                }
                .abi_encode()
                .into()
            }
            Self::BeforeStartTime => ILSP25Errors::RelayCallBeforeStartTime {}.abi_encode().into(),
            Self::Expired => ILSP25Errors::RelayCallExpired {}.abi_encode().into(),
        }
    }
}

impl AccountError {
    pub fn revert_data(&self) -> Bytes {
        match self {
            Self::Reverted(data) => data.clone(),
            Self::Ownership(err) => err.revert_data(),
        }
    }
}

impl OwnershipError {
    pub fn revert_data(&self) -> Bytes {
        match self {
            Self::CallerNotTheOwner(caller) => {
                ILSP14Errors::OwnableCallerNotTheOwner { callerAddress: *caller }.abi_encode().into()
            }
            Self::CallerNotPendingOwner(caller) => {
                ILSP14Errors::LSP14CallerNotPendingOwner { caller: *caller }.abi_encode().into()
            }
            Self::CannotTransferOwnershipToSelf => {
                ILSP14Errors::LSP14CannotTransferOwnershipToSelf {}.abi_encode().into()
            }
            Self::NotInRenounceOwnershipInterval { start, end } => {
                ILSP14Errors::LSP14NotInRenounceOwnershipInterval {
                    renounceOwnershipStart: U256::from(*start),
                    renounceOwnershipEnd: U256::from(*end),
                }
                .abi_encode()
                .into()
            }
        }
    }
}
