//! ERC725Y `setData` / `setDataBatch` rules.
//!
//! Every key is classified first. Keys of the permission namespace, the universal receiver
//! delegate and extensions are gated by add/change permissions depending on whether something
//! is stored there already. Everything else needs SETDATA plus a matching allowed data key.

use alloy_primitives::{Address, Bytes, B256};
use lsp6_permission_types::{
    decode_allowed_calls, decode_allowed_data_keys, keys::DataKeyKind, AllowedDataKey,
    PermissionSet,
};
use tracing::{trace, warn};

use super::{require, CallAuthorizer};
use crate::{account::Account, context::ChainContext, errors::KeyManagerError};

impl<A: Account, C: ChainContext> CallAuthorizer<'_, A, C> {
    pub(crate) fn verify_can_set_data(
        &self,
        from: Address,
        permissions: PermissionSet,
        entries: &[(B256, Bytes)],
    ) -> Result<(), KeyManagerError> {
        // Decoded on the first ordinary key, then reused for the rest of the batch.
        let mut allowed_keys: Option<Vec<AllowedDataKey>> = None;

        for (key, value) in entries {
            let kind = DataKeyKind::classify(key);
            trace!(%from, %key, ?kind, "checking data key");
            if kind == DataKeyKind::Other {
                require(from, permissions, PermissionSet::SETDATA)?;
                if allowed_keys.is_none() {
                    allowed_keys = Some(self.allowed_data_keys(from)?);
                }
                let allowed = allowed_keys.as_deref().unwrap_or_default();
                if !allowed.iter().any(|prefix| prefix.matches(key)) {
                    warn!(%from, %key, "data key not allowed");
                    return Err(KeyManagerError::NotAllowedERC725YDataKey { from, key: *key });
                }
                continue;
            }
            let needed = self.permission_for_reserved_key(kind, key, value)?;
            require(from, permissions, needed)?;
        }
        Ok(())
    }

    fn allowed_data_keys(&self, from: Address) -> Result<Vec<AllowedDataKey>, KeyManagerError> {
        let encoded = self.registry.allowed_data_keys_of(from);
        let allowed = decode_allowed_data_keys(&encoded).map_err(|reason| {
            warn!(%from, %reason, "malformed allowed data keys");
            KeyManagerError::InvalidEncodedAllowedERC725YDataKeys {
                value: encoded.clone(),
                reason,
            }
        })?;
        if allowed.is_empty() {
            warn!(%from, "no allowed data keys");
            return Err(KeyManagerError::NoERC725YDataKeysAllowed { from });
        }
        Ok(allowed)
    }

    fn permission_for_reserved_key(
        &self,
        kind: DataKeyKind,
        key: &B256,
        value: &Bytes,
    ) -> Result<PermissionSet, KeyManagerError> {
        let invalid_value = || KeyManagerError::InvalidDataValuesForDataKeys {
            key: *key,
            value: value.clone(),
        };
        let add_or_edit = |adding: bool| {
            if adding {
                PermissionSet::ADDCONTROLLER
            } else {
                PermissionSet::EDITPERMISSIONS
            }
        };

        let needed = match kind {
            DataKeyKind::PermissionsArrayLength => {
                if !value.is_empty() && value.len() != 16 {
                    return Err(invalid_value());
                }
                let current = array_length(&self.account.get_data(*key));
                add_or_edit(array_length(value) > current)
            }
            DataKeyKind::PermissionsArrayElement(_) => {
                if !value.is_empty() && value.len() != 20 {
                    return Err(invalid_value());
                }
                add_or_edit(self.account.get_data(*key).is_empty())
            }
            DataKeyKind::Permissions(controller) => {
                if !value.is_empty() && value.len() != 32 {
                    return Err(invalid_value());
                }
                add_or_edit(self.registry.permissions_of(controller).is_empty())
            }
            DataKeyKind::AllowedCalls(controller) => {
                if let Err(reason) = decode_allowed_calls(value) {
                    return Err(KeyManagerError::InvalidEncodedAllowedCalls {
                        value: value.clone(),
                        reason,
                    });
                }
                add_or_edit(self.is_new_allow_list(controller, key))
            }
            DataKeyKind::AllowedDataKeys(controller) => {
                if let Err(reason) = decode_allowed_data_keys(value) {
                    return Err(KeyManagerError::InvalidEncodedAllowedERC725YDataKeys {
                        value: value.clone(),
                        reason,
                    });
                }
                add_or_edit(self.is_new_allow_list(controller, key))
            }
            DataKeyKind::UnrecognisedPermissionKey => {
                warn!(%key, "unrecognised permission data key");
                return Err(KeyManagerError::NotRecognisedPermissionKey(*key));
            }
            DataKeyKind::UniversalReceiverDelegate => {
                if self.account.get_data(*key).is_empty() {
                    PermissionSet::ADDUNIVERSALRECEIVERDELEGATE
                } else {
                    PermissionSet::CHANGEUNIVERSALRECEIVERDELEGATE
                }
            }
            DataKeyKind::Extension => {
                if self.account.get_data(*key).is_empty() {
                    PermissionSet::ADDEXTENSIONS
                } else {
                    PermissionSet::CHANGEEXTENSIONS
                }
            }
            DataKeyKind::Other => PermissionSet::SETDATA,
        };
        Ok(needed)
    }

    // Writing an allow-list counts as adding a controller until it has both a list and permissions.
    fn is_new_allow_list(&self, controller: Address, key: &B256) -> bool {
        self.account.get_data(*key).is_empty() || self.registry.permissions_of(controller).is_empty()
    }
}

/// `AddressPermissions[]` stores a `uint128`. Empty reads as zero.
fn array_length(value: &[u8]) -> u128 {
    let mut raw = [0u8; 16];
    let n = value.len().min(16);
    raw[..n].copy_from_slice(&value[..n]);
    u128::from_be_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account::MemoryAccount, context::MemoryChain};
    use alloy_primitives::{address, b256, hex};
    use lsp6_permission_types::{
        encode_allowed_calls, encode_allowed_data_keys,
        keys::{
            allowed_calls_key, allowed_data_keys_key, permissions_array_element_key,
            permissions_key, ADDRESS_PERMISSIONS_ARRAY, LSP1_UNIVERSAL_RECEIVER_DELEGATE,
        },
        AllowedCall, CallTypes,
    };

    const KM: Address = address!("4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b");
    const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");
    const BOB: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");
    const CAROL: Address = address!("ca201ca201ca201ca201ca201ca201ca201ca201");
    const PROFILE_KEY: B256 =
        b256!("5ef83ad9559033e6e941db7d7c495acdce616347d28e90c7ce47cbfcfcad3bc5");

    fn account_with(permissions: PermissionSet) -> MemoryAccount {
        let account = MemoryAccount::new(ACCOUNT, KM);
        account.seed_data(permissions_key(BOB), permissions.to_word().to_vec());
        account
    }

    fn check(account: &MemoryAccount, entries: &[(B256, Bytes)]) -> Result<(), KeyManagerError> {
        let chain = MemoryChain::new(42);
        let authorizer = CallAuthorizer::new(KM, account, &chain);
        let permissions = authorizer.registry().permissions_of(BOB);
        authorizer.verify_can_set_data(BOB, permissions, entries)
    }

    fn entry(key: B256, value: impl Into<Bytes>) -> (B256, Bytes) {
        (key, value.into())
    }

    #[test]
    fn ordinary_keys_need_setdata_and_an_allowed_prefix() {
        let account = account_with(PermissionSet::SETDATA);
        account.seed_data(
            allowed_data_keys_key(BOB),
            encode_allowed_data_keys(&[AllowedDataKey::new(hex!("5ef83ad9").to_vec()).unwrap()])
                .unwrap(),
        );
        assert!(check(&account, &[entry(PROFILE_KEY, hex!("01").to_vec())]).is_ok());
        assert_eq!(
            check(&account, &[entry(PROFILE_KEY, vec![1]), entry(B256::ZERO, vec![1])]),
            Err(KeyManagerError::NotAllowedERC725YDataKey { from: BOB, key: B256::ZERO })
        );
    }

    #[test]
    fn ordinary_keys_without_setdata() {
        let account = account_with(PermissionSet::CALL);
        assert_eq!(
            check(&account, &[entry(PROFILE_KEY, vec![1])]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::SETDATA))
        );
    }

    #[test]
    fn missing_or_malformed_allowed_data_keys() {
        let account = account_with(PermissionSet::SETDATA);
        assert_eq!(
            check(&account, &[entry(PROFILE_KEY, vec![1])]),
            Err(KeyManagerError::NoERC725YDataKeysAllowed { from: BOB })
        );

        account.seed_data(allowed_data_keys_key(BOB), hex!("0000").to_vec());
        assert!(matches!(
            check(&account, &[entry(PROFILE_KEY, vec![1])]),
            Err(KeyManagerError::InvalidEncodedAllowedERC725YDataKeys { .. })
        ));
    }

    #[test]
    fn permissions_add_versus_edit() {
        let account = account_with(PermissionSet::ADDCONTROLLER);
        let word = PermissionSet::CALL.to_word().to_vec();
        assert!(check(&account, &[entry(permissions_key(CAROL), word.clone())]).is_ok());

        account.seed_data(permissions_key(CAROL), word.clone());
        assert_eq!(
            check(&account, &[entry(permissions_key(CAROL), word)]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::EDITPERMISSIONS))
        );
    }

    #[test]
    fn permissions_value_must_be_a_word() {
        let account = account_with(PermissionSet::ADDCONTROLLER);
        assert_eq!(
            check(&account, &[entry(permissions_key(CAROL), vec![0x08])]),
            Err(KeyManagerError::InvalidDataValuesForDataKeys {
                key: permissions_key(CAROL),
                value: Bytes::from(vec![0x08]),
            })
        );
    }

    #[test]
    fn array_length_grows_with_addcontroller_only() {
        let account = account_with(PermissionSet::EDITPERMISSIONS);
        account.seed_data(ADDRESS_PERMISSIONS_ARRAY, 2u128.to_be_bytes().to_vec());
        assert!(check(&account, &[entry(ADDRESS_PERMISSIONS_ARRAY, 1u128.to_be_bytes().to_vec())]).is_ok());
        assert_eq!(
            check(&account, &[entry(ADDRESS_PERMISSIONS_ARRAY, 3u128.to_be_bytes().to_vec())]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::ADDCONTROLLER))
        );
        assert!(matches!(
            check(&account, &[entry(ADDRESS_PERMISSIONS_ARRAY, vec![0x03])]),
            Err(KeyManagerError::InvalidDataValuesForDataKeys { .. })
        ));
    }

    #[test]
    fn array_elements_hold_addresses() {
        let account = account_with(PermissionSet::ADDCONTROLLER);
        let key = permissions_array_element_key(0);
        assert!(check(&account, &[entry(key, CAROL.to_vec())]).is_ok());
        assert!(matches!(
            check(&account, &[entry(key, vec![0u8; 32])]),
            Err(KeyManagerError::InvalidDataValuesForDataKeys { .. })
        ));
        account.seed_data(key, CAROL.to_vec());
        assert_eq!(
            check(&account, &[entry(key, Bytes::new())]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::EDITPERMISSIONS))
        );
    }

    #[test]
    fn allowed_calls_add_versus_edit() {
        let list = encode_allowed_calls(&[AllowedCall::any_function(CallTypes::CALL, CAROL)]);
        let key = allowed_calls_key(CAROL);

        let adder = account_with(PermissionSet::ADDCONTROLLER);
        adder.seed_data(permissions_key(CAROL), PermissionSet::CALL.to_word().to_vec());
        assert!(check(&adder, &[entry(key, list.clone())]).is_ok());
        adder.seed_data(key, list.clone());
        assert_eq!(
            check(&adder, &[entry(key, Bytes::new())]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::EDITPERMISSIONS))
        );

        // Without permissions the controller is still being set up.
        let editor = account_with(PermissionSet::EDITPERMISSIONS);
        editor.seed_data(key, list.clone());
        assert_eq!(
            check(&editor, &[entry(key, list)]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::ADDCONTROLLER))
        );
    }

    #[test]
    fn allow_list_encoding_is_checked_before_permissions() {
        let account = account_with(PermissionSet::CALL);
        assert!(matches!(
            check(&account, &[entry(allowed_calls_key(CAROL), hex!("badbadbadbad").to_vec())]),
            Err(KeyManagerError::InvalidEncodedAllowedCalls { .. })
        ));
        assert!(matches!(
            check(&account, &[entry(allowed_data_keys_key(CAROL), hex!("badbadbadbad").to_vec())]),
            Err(KeyManagerError::InvalidEncodedAllowedERC725YDataKeys { .. })
        ));
    }

    #[test]
    fn unknown_permission_key_is_rejected() {
        let account = account_with(PermissionSet::ALL_PERMISSIONS);
        let key = b256!("4b80742de2bf0000000000000000000000000000000000000000000000000000");
        assert_eq!(
            check(&account, &[entry(key, vec![1])]),
            Err(KeyManagerError::NotRecognisedPermissionKey(key))
        );
    }

    #[test]
    fn receiver_delegate_and_extensions() {
        let account = account_with(PermissionSet::ADDUNIVERSALRECEIVERDELEGATE);
        assert!(check(&account, &[entry(LSP1_UNIVERSAL_RECEIVER_DELEGATE, CAROL.to_vec())]).is_ok());
        account.seed_data(LSP1_UNIVERSAL_RECEIVER_DELEGATE, CAROL.to_vec());
        assert_eq!(
            check(&account, &[entry(LSP1_UNIVERSAL_RECEIVER_DELEGATE, Bytes::new())]),
            Err(KeyManagerError::not_authorised(
                BOB,
                PermissionSet::CHANGEUNIVERSALRECEIVERDELEGATE
            ))
        );

        let extension = b256!("cee78b4094da860110960000aabbccdd00000000000000000000000000000000");
        assert_eq!(
            check(&account, &[entry(extension, CAROL.to_vec())]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::ADDEXTENSIONS))
        );
    }

    #[test]
    fn unpadded_extension_lookalike_is_ordinary_data() {
        let key = b256!("cee78b4094da86011096ffffaabbccdd00000000000000000000000000000000");

        let extender = account_with(PermissionSet::ADDEXTENSIONS);
        assert_eq!(
            check(&extender, &[entry(key, CAROL.to_vec())]),
            Err(KeyManagerError::not_authorised(BOB, PermissionSet::SETDATA))
        );

        let writer = account_with(PermissionSet::SETDATA);
        writer.seed_data(
            allowed_data_keys_key(BOB),
            encode_allowed_data_keys(&[
                AllowedDataKey::new(hex!("cee78b4094da86011096ffff").to_vec()).unwrap()
            ])
            .unwrap(),
        );
        assert!(check(&writer, &[entry(key, CAROL.to_vec())]).is_ok());
    }
}
