//! `AddressPermissions:AllowedERC725YDataKeys:<controller>` entries.
//!
//! Elements are free-length key prefixes of 1 to 32 bytes. A data key is allowed when it
//! starts with one of them; a full 32-byte element therefore pins a single key.

use alloc::vec::Vec;

use alloy_primitives::{Bytes, B256};

use crate::{
    compact::{write_element, CompactArrayReader},
    error::CodecError,
};

/// Longest meaningful prefix: a whole data key.
pub const MAX_DATA_KEY_PREFIX_LEN: usize = 32;

/// One allowed data key prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AllowedDataKey(Bytes);

impl AllowedDataKey {
    pub fn new(prefix: impl Into<Bytes>) -> Result<Self, CodecError> {
        let prefix = prefix.into();
        check_prefix_len(0, prefix.len())?;
        Ok(Self(prefix))
    }

    /// An exact (full-width) key.
    pub fn exact(key: B256) -> Self {
        Self(Bytes::copy_from_slice(key.as_slice()))
    }

    pub fn prefix(&self) -> &[u8] {
        &self.0
    }

    pub fn matches(&self, key: &B256) -> bool {
        key.as_slice().starts_with(&self.0)
    }
}

fn check_prefix_len(offset: usize, len: usize) -> Result<(), CodecError> {
    if len == 0 {
        return Err(CodecError::EmptyElement { offset });
    }
    if len > MAX_DATA_KEY_PREFIX_LEN {
        return Err(CodecError::InvalidElementLength { offset, len });
    }
    Ok(())
}

pub fn decode_allowed_data_keys(bytes: &[u8]) -> Result<Vec<AllowedDataKey>, CodecError> {
    let mut keys = Vec::new();
    for item in CompactArrayReader::new(bytes) {
        let (offset, element) = item?;
        check_prefix_len(offset, element.len())?;
        keys.push(AllowedDataKey(Bytes::copy_from_slice(element)));
    }
    Ok(keys)
}

pub fn is_valid_allowed_data_keys(bytes: &[u8]) -> bool {
    decode_allowed_data_keys(bytes).is_ok()
}

pub fn encode_allowed_data_keys(keys: &[AllowedDataKey]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    for key in keys {
        write_element(&mut buf, key.prefix())?;
    }
    Ok(buf)
}
