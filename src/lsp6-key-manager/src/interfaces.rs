//! Solidity custom errors raised by the key manager and the account, used to render
//! revert data.

use alloy_sol_types::sol;

sol! {
    interface ILSP6Errors {
        error NoPermissionsSet(address from);
        error NotAuthorised(address from, string permission);

        error NoCallsAllowed(address from);
        error NotAllowedCall(address from, address to, bytes4 selector);
        error InvalidWhitelistedCall(address from);
        error InvalidEncodedAllowedCalls(bytes allowedCallsValue);

        error NoERC725YDataKeysAllowed(address from);
        error NotAllowedERC725YDataKey(address from, bytes32 disallowedKey);
        error InvalidEncodedAllowedERC725YDataKeys(bytes value);
        error InvalidDataValuesForDataKeys(bytes32 dataKey, bytes dataValue);
        error NotRecognisedPermissionKey(bytes32 dataKey);

        error CallingKeyManagerNotAllowed();
        error InvalidPayload(bytes payload);
        error InvalidERC725Function(bytes4 invalidFunction);

        error BatchExecuteParamsLengthMismatch();
        error LSP6BatchInsufficientValueSent(uint256 totalValues, uint256 msgValue);
        error LSP6BatchExcessiveValueSent(uint256 totalValues, uint256 msgValue);
    }

    interface IERC725Errors {
        error ERC725X_ExecuteParametersLengthMismatch();
        error ERC725X_ExecuteParametersEmptyArray();
        error ERC725Y_DataKeysValuesLengthMismatch();
        error ERC725Y_DataKeysValuesEmptyArray();
    }

    interface ILSP25Errors {
        error InvalidRelayNonce(address signer, uint256 invalidNonce, bytes signature);
        error RelayCallBeforeStartTime();
        error RelayCallExpired();
        error ECDSAInvalidSignature();
    }

    interface ILSP14Errors {
        error OwnableCallerNotTheOwner(address callerAddress);
        error LSP14CallerNotPendingOwner(address caller);
        error LSP14CannotTransferOwnershipToSelf();
        error LSP14NotInRenounceOwnershipInterval(uint256 renounceOwnershipStart, uint256 renounceOwnershipEnd);
    }
}
