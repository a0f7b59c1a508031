//! Reserved ERC725Y data keys of the LSP6 permission namespace and its neighbours.

use alloy_primitives::{b256, hex, Address, B256};

/// `keccak256("AddressPermissions[]")`: array length of registered controllers.
pub const ADDRESS_PERMISSIONS_ARRAY: B256 =
    b256!("df30dba06db6a30e65354d9a64c609861f089545ca58c6b4dbe31a5f338cb0e3");

/// First half of the array key; followed by a `uint128` index for element keys.
pub const ADDRESS_PERMISSIONS_ARRAY_PREFIX: [u8; 16] = hex!("df30dba06db6a30e65354d9a64c60986");

/// Every `AddressPermissions:*` mapping key starts with these bytes.
pub const ADDRESS_PERMISSIONS_PREFIX: [u8; 6] = hex!("4b80742de2bf");

/// `AddressPermissions:Permissions:<address>`
pub const PERMISSIONS_PREFIX: [u8; 12] = hex!("4b80742de2bf82acb3630000");

/// `AddressPermissions:AllowedCalls:<address>`
pub const ALLOWED_CALLS_PREFIX: [u8; 12] = hex!("4b80742de2bf393a64c70000");

/// `AddressPermissions:AllowedERC725YDataKeys:<address>`
pub const ALLOWED_DATA_KEYS_PREFIX: [u8; 12] = hex!("4b80742de2bf866c29110000");

/// `keccak256("LSP1UniversalReceiverDelegate")`
pub const LSP1_UNIVERSAL_RECEIVER_DELEGATE: B256 =
    b256!("0cfc51aec37c55a4d0b1a65c6255c4bf2fbdf6277f3cc0730c45b828b6db8b47");

/// `LSP1UniversalReceiverDelegate:<bytes32 typeId>` mapping prefix.
pub const LSP1_UNIVERSAL_RECEIVER_DELEGATE_PREFIX: [u8; 12] = hex!("0cfc51aec37c55a4d0b10000");

/// `LSP17Extension:<bytes4 selector>` mapping prefix.
pub const LSP17_EXTENSION_PREFIX: [u8; 12] = hex!("cee78b4094da860110960000");

/// `prefix(12) ‖ address(20)`
pub fn mapping_key(prefix: [u8; 12], address: Address) -> B256 {
    let mut key = [0u8; 32];
    key[0..12].copy_from_slice(&prefix);
    key[12..32].copy_from_slice(address.as_slice());
    B256::new(key)
}

pub fn permissions_key(controller: Address) -> B256 {
    mapping_key(PERMISSIONS_PREFIX, controller)
}

pub fn allowed_calls_key(controller: Address) -> B256 {
    mapping_key(ALLOWED_CALLS_PREFIX, controller)
}

pub fn allowed_data_keys_key(controller: Address) -> B256 {
    mapping_key(ALLOWED_DATA_KEYS_PREFIX, controller)
}

/// `AddressPermissions[index]`
pub fn permissions_array_element_key(index: u128) -> B256 {
    let mut key = [0u8; 32];
    key[0..16].copy_from_slice(&ADDRESS_PERMISSIONS_ARRAY_PREFIX);
    key[16..32].copy_from_slice(&index.to_be_bytes());
    B256::new(key)
}

/// Which rule family a data key falls under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKeyKind {
    PermissionsArrayLength,
    PermissionsArrayElement(u128),
    Permissions(Address),
    AllowedCalls(Address),
    AllowedDataKeys(Address),
    /// Inside `AddressPermissions:*` but none of the known layouts.
    UnrecognisedPermissionKey,
    UniversalReceiverDelegate,
    Extension,
    /// Ordinary account data, gated by SETDATA.
    Other,
}

impl DataKeyKind {
    pub fn classify(key: &B256) -> Self {
        let bytes = key.as_slice();
        if *key == ADDRESS_PERMISSIONS_ARRAY {
            return Self::PermissionsArrayLength;
        }
        if bytes[0..16] == ADDRESS_PERMISSIONS_ARRAY_PREFIX {
            let mut index = [0u8; 16];
            index.copy_from_slice(&bytes[16..32]);
            return Self::PermissionsArrayElement(u128::from_be_bytes(index));
        }
        if bytes[0..6] == ADDRESS_PERMISSIONS_PREFIX {
            let controller = Address::from_slice(&bytes[12..32]);
            return match &bytes[0..12] {
                p if p == PERMISSIONS_PREFIX => Self::Permissions(controller),
                p if p == ALLOWED_CALLS_PREFIX => Self::AllowedCalls(controller),
                p if p == ALLOWED_DATA_KEYS_PREFIX => Self::AllowedDataKeys(controller),
                _ => Self::UnrecognisedPermissionKey,
            };
        }
        if *key == LSP1_UNIVERSAL_RECEIVER_DELEGATE
            || bytes[0..12] == LSP1_UNIVERSAL_RECEIVER_DELEGATE_PREFIX
        {
            return Self::UniversalReceiverDelegate;
        }
        if bytes[0..12] == LSP17_EXTENSION_PREFIX {
            return Self::Extension;
        }
        Self::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const BOB: Address = address!("cafecafecafecafecafecafecafecafecafecafe");

    #[test]
    fn builds_mapping_keys() {
        assert_eq!(
            permissions_key(BOB),
            b256!("4b80742de2bf82acb3630000cafecafecafecafecafecafecafecafecafecafe")
        );
        assert_eq!(
            permissions_array_element_key(2),
            b256!("df30dba06db6a30e65354d9a64c6098600000000000000000000000000000002")
        );
    }

    #[test]
    fn classifies_reserved_keys() {
        assert_eq!(
            DataKeyKind::classify(&ADDRESS_PERMISSIONS_ARRAY),
            DataKeyKind::PermissionsArrayLength
        );
        assert_eq!(
            DataKeyKind::classify(&permissions_array_element_key(7)),
            DataKeyKind::PermissionsArrayElement(7)
        );
        assert_eq!(DataKeyKind::classify(&permissions_key(BOB)), DataKeyKind::Permissions(BOB));
        assert_eq!(DataKeyKind::classify(&allowed_calls_key(BOB)), DataKeyKind::AllowedCalls(BOB));
        assert_eq!(
            DataKeyKind::classify(&allowed_data_keys_key(BOB)),
            DataKeyKind::AllowedDataKeys(BOB)
        );
        assert_eq!(
            DataKeyKind::classify(&b256!(
                "4b80742de2bf0000000000000000000000000000000000000000000000000000"
            )),
            DataKeyKind::UnrecognisedPermissionKey
        );
        assert_eq!(
            DataKeyKind::classify(&LSP1_UNIVERSAL_RECEIVER_DELEGATE),
            DataKeyKind::UniversalReceiverDelegate
        );
        assert_eq!(
            DataKeyKind::classify(&b256!(
                "cee78b4094da860110960000aabbccdd00000000000000000000000000000000"
            )),
            DataKeyKind::Extension
        );
        assert_eq!(DataKeyKind::classify(&B256::ZERO), DataKeyKind::Other);
    }

    #[test]
    fn mapping_prefixes_include_the_padding() {
        assert_eq!(
            DataKeyKind::classify(&b256!(
                "0cfc51aec37c55a4d0b10000aabbccdd00000000000000000000000000000000"
            )),
            DataKeyKind::UniversalReceiverDelegate
        );
        // Same first 10 bytes, non-zero padding: ordinary data.
        assert_eq!(
            DataKeyKind::classify(&b256!(
                "cee78b4094da86011096ffff0000000000000000000000000000000000000000"
            )),
            DataKeyKind::Other
        );
        assert_eq!(
            DataKeyKind::classify(&b256!(
                "0cfc51aec37c55a4d0b1ffff0000000000000000000000000000000000000000"
            )),
            DataKeyKind::Other
        );
    }
}
