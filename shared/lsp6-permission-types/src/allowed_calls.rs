//! `AddressPermissions:AllowedCalls:<controller>` entries.
//!
//! Each element of the compact array is exactly 32 bytes:
//! `bytes4 callTypes ‖ address target ‖ bytes4 standard ‖ bytes4 selector`.

use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes};
use bitflags::bitflags;

use crate::{compact::CompactArrayReader, error::CodecError};

/// Width of one encoded allowed call.
pub const ALLOWED_CALL_LEN: usize = 32;

/// Wildcard target address.
pub const ANY_ADDRESS: Address = Address::new([0xff; 20]);
/// Wildcard interface id.
pub const ANY_STANDARD: FixedBytes<4> = FixedBytes::new([0xff; 4]);
/// Wildcard function selector.
pub const ANY_FUNCTION: FixedBytes<4> = FixedBytes::new([0xff; 4]);

bitflags! {
    /// Restriction mask stored in the first 4 bytes of an allowed call.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CallTypes: u32 {
        /// Native value transfer.
        const VALUE = 1 << 0;
        /// Plain `CALL`.
        const CALL = 1 << 1;
        /// `STATICCALL`.
        const STATICCALL = 1 << 2;
        /// `DELEGATECALL`.
        const DELEGATECALL = 1 << 3;
    }
}

/// One decoded allowed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllowedCall {
    pub call_types: CallTypes,
    pub address: Address,
    pub standard: FixedBytes<4>,
    pub function: FixedBytes<4>,
}

impl AllowedCall {
    pub const fn new(
        call_types: CallTypes,
        address: Address,
        standard: FixedBytes<4>,
        function: FixedBytes<4>,
    ) -> Self {
        Self {
            call_types,
            address,
            standard,
            function,
        }
    }

    /// Any function on `address`, whatever interface it supports.
    pub const fn any_function(call_types: CallTypes, address: Address) -> Self {
        Self::new(call_types, address, ANY_STANDARD, ANY_FUNCTION)
    }

    /// Parse a single 32-byte element.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != ALLOWED_CALL_LEN {
            return Err(CodecError::InvalidElementLength {
                offset: 0,
                len: bytes.len(),
            });
        }
        let mut mask = [0u8; 4];
        mask.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            // Unknown bits are kept so re-encoding is lossless.
            call_types: CallTypes::from_bits_retain(u32::from_be_bytes(mask)),
            address: Address::from_slice(&bytes[4..24]),
            standard: FixedBytes::from_slice(&bytes[24..28]),
            function: FixedBytes::from_slice(&bytes[28..32]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ALLOWED_CALL_LEN] {
        let mut out = [0u8; ALLOWED_CALL_LEN];
        out[0..4].copy_from_slice(&self.call_types.bits().to_be_bytes());
        out[4..24].copy_from_slice(self.address.as_slice());
        out[24..28].copy_from_slice(self.standard.as_slice());
        out[28..32].copy_from_slice(self.function.as_slice());
        out
    }

    /// Target, standard and selector are all wildcards.
    ///
    /// Such an entry would whitelist every call of its call types; it is rejected when
    /// encountered instead of being honoured.
    pub fn is_unrestricted(&self) -> bool {
        self.address == ANY_ADDRESS && self.standard == ANY_STANDARD && self.function == ANY_FUNCTION
    }

    pub fn allows_call_types(&self, required: CallTypes) -> bool {
        self.call_types.contains(required)
    }

    pub fn allows_address(&self, target: Address) -> bool {
        self.address == ANY_ADDRESS || self.address == target
    }

    pub fn is_any_standard(&self) -> bool {
        self.standard == ANY_STANDARD
    }

    pub fn allows_function(&self, selector: FixedBytes<4>) -> bool {
        self.function == ANY_FUNCTION || self.function == selector
    }
}

/// First four bytes of `data`, zero padded. Empty data selects `0x00000000`.
pub fn selector_of(data: &[u8]) -> FixedBytes<4> {
    let mut selector = [0u8; 4];
    let n = data.len().min(4);
    selector[..n].copy_from_slice(&data[..n]);
    FixedBytes(selector)
}

/// Decode an allowed-calls compact array. Every element must be exactly 32 bytes.
pub fn decode_allowed_calls(bytes: &[u8]) -> Result<Vec<AllowedCall>, CodecError> {
    let mut calls = Vec::with_capacity(bytes.len() / (ALLOWED_CALL_LEN + 2));
    for item in CompactArrayReader::new(bytes) {
        let (offset, element) = item?;
        if element.len() != ALLOWED_CALL_LEN {
            return Err(CodecError::InvalidElementLength {
                offset,
                len: element.len(),
            });
        }
        calls.push(AllowedCall::from_slice(element)?);
    }
    Ok(calls)
}

/// Check the encoding without materialising the entries.
pub fn is_valid_allowed_calls(bytes: &[u8]) -> bool {
    CompactArrayReader::new(bytes)
        .all(|item| matches!(item, Ok((_, element)) if element.len() == ALLOWED_CALL_LEN))
}

pub fn encode_allowed_calls(calls: &[AllowedCall]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(calls.len() * (ALLOWED_CALL_LEN + 2));
    for call in calls {
        // Fixed 32-byte elements always fit the length prefix.
        buf.extend_from_slice(&(ALLOWED_CALL_LEN as u16).to_be_bytes());
        buf.extend_from_slice(&call.to_bytes());
    }
    buf
}
