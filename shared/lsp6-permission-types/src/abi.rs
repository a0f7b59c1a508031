//! Solidity ABI of the two contracts involved: the controlled account (LSP0 / ERC725) and
//! the key manager in front of it (LSP6).
//!
//! The engine decodes account calldata with these bindings and the off-chain tooling uses
//! them to build the same calldata, so both sides stay byte-compatible.

use alloy_sol_types::sol;

sol! {
    /// Privileged functions of the controlled account.
    interface ILSP0 {
        function setData(bytes32 dataKey, bytes dataValue) external payable;
        function setDataBatch(bytes32[] dataKeys, bytes[] dataValues) external payable;

        function execute(uint256 operationType, address target, uint256 value, bytes data)
            external
            payable
            returns (bytes);
        function executeBatch(
            uint256[] operationsType,
            address[] targets,
            uint256[] values,
            bytes[] datas
        ) external payable returns (bytes[]);

        function transferOwnership(address newOwner) external;
        function acceptOwnership() external;
        function renounceOwnership() external;
    }

    /// External surface of the key manager.
    interface ILSP6 {
        event PermissionsVerified(address indexed signer, uint256 indexed value, bytes4 indexed selector);

        function execute(bytes payload) external payable returns (bytes);
        function executeBatch(uint256[] values, bytes[] payloads) external payable returns (bytes[]);

        function executeRelayCall(
            bytes signature,
            uint256 nonce,
            uint256 validityTimestamps,
            bytes payload
        ) external payable returns (bytes);
        function executeRelayCallBatch(
            bytes[] signatures,
            uint256[] nonces,
            uint256[] validityTimestamps,
            uint256[] values,
            bytes[] payloads
        ) external payable returns (bytes[]);

        function getNonce(address from, uint128 channelId) external view returns (uint256);
        function isValidSignature(bytes32 dataHash, bytes signature) external view returns (bytes4);
    }
}
