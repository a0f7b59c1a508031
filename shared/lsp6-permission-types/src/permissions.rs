//! The 256-bit permission word stored under `AddressPermissions:Permissions:<controller>`.
//!
//! Bits are independent flags. A `SUPER_*` bit does not imply its base bit: it only means
//! the allow-list of that class is not consulted. [`PermissionSet::super_of`] is the single
//! place where that relation is written down.

use core::{
    fmt,
    ops::{BitAnd, BitOr, BitOrAssign, Not},
};

use alloy_primitives::{B256, U256};

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet(U256);

const fn bit(index: usize) -> PermissionSet {
    PermissionSet(U256::from_limbs([1u64 << index, 0, 0, 0]))
}

impl PermissionSet {
    pub const NONE: Self = Self(U256::ZERO);

    pub const CHANGEOWNER: Self = bit(0);
    pub const ADDCONTROLLER: Self = bit(1);
    pub const EDITPERMISSIONS: Self = bit(2);
    pub const ADDEXTENSIONS: Self = bit(3);
    pub const CHANGEEXTENSIONS: Self = bit(4);
    pub const ADDUNIVERSALRECEIVERDELEGATE: Self = bit(5);
    pub const CHANGEUNIVERSALRECEIVERDELEGATE: Self = bit(6);
    pub const REENTRANCY: Self = bit(7);
    pub const SUPER_TRANSFERVALUE: Self = bit(8);
    pub const TRANSFERVALUE: Self = bit(9);
    pub const SUPER_CALL: Self = bit(10);
    pub const CALL: Self = bit(11);
    pub const SUPER_STATICCALL: Self = bit(12);
    pub const STATICCALL: Self = bit(13);
    pub const SUPER_DELEGATECALL: Self = bit(14);
    pub const DELEGATECALL: Self = bit(15);
    pub const DEPLOY: Self = bit(16);
    // bit 17 is reserved: the SETDATA class has no super variant.
    pub const SETDATA: Self = bit(18);
    pub const ENCRYPT: Self = bit(19);
    pub const DECRYPT: Self = bit(20);
    pub const SIGN: Self = bit(21);
    pub const EXECUTE_RELAY_CALL: Self = bit(22);

    /// Every named bit except REENTRANCY, SUPER_DELEGATECALL and DELEGATECALL.
    pub const ALL_PERMISSIONS: Self = Self(U256::from_limbs([0x7d_3f7f, 0, 0, 0]));

    /// Canonical names, as reported in `NotAuthorised` errors.
    pub const NAMED: [(&'static str, Self); 22] = [
        ("CHANGEOWNER", Self::CHANGEOWNER),
        ("ADDCONTROLLER", Self::ADDCONTROLLER),
        ("EDITPERMISSIONS", Self::EDITPERMISSIONS),
        ("ADDEXTENSIONS", Self::ADDEXTENSIONS),
        ("CHANGEEXTENSIONS", Self::CHANGEEXTENSIONS),
        ("ADDUNIVERSALRECEIVERDELEGATE", Self::ADDUNIVERSALRECEIVERDELEGATE),
        ("CHANGEUNIVERSALRECEIVERDELEGATE", Self::CHANGEUNIVERSALRECEIVERDELEGATE),
        ("REENTRANCY", Self::REENTRANCY),
        ("SUPER_TRANSFERVALUE", Self::SUPER_TRANSFERVALUE),
        ("TRANSFERVALUE", Self::TRANSFERVALUE),
        ("SUPER_CALL", Self::SUPER_CALL),
        ("CALL", Self::CALL),
        ("SUPER_STATICCALL", Self::SUPER_STATICCALL),
        ("STATICCALL", Self::STATICCALL),
        ("SUPER_DELEGATECALL", Self::SUPER_DELEGATECALL),
        ("DELEGATECALL", Self::DELEGATECALL),
        ("DEPLOY", Self::DEPLOY),
        ("SETDATA", Self::SETDATA),
        ("ENCRYPT", Self::ENCRYPT),
        ("DECRYPT", Self::DECRYPT),
        ("SIGN", Self::SIGN),
        ("EXECUTE_RELAY_CALL", Self::EXECUTE_RELAY_CALL),
    ];

    pub const fn from_u256(word: U256) -> Self {
        Self(word)
    }

    pub const fn as_u256(self) -> U256 {
        self.0
    }

    pub fn from_word(word: B256) -> Self {
        Self(U256::from_be_bytes(word.0))
    }

    pub fn to_word(self) -> B256 {
        B256::new(self.0.to_be_bytes::<32>())
    }

    /// Interpret a raw stored value.
    ///
    /// Values shorter than a word are left-padded with zeros, longer ones are cut to their
    /// first 32 bytes. Never fails.
    pub fn from_stored_value(value: &[u8]) -> Self {
        if value.len() >= 32 {
            return Self(U256::from_be_slice(&value[..32]));
        }
        Self(U256::from_be_slice(value))
    }

    pub fn is_empty(self) -> bool {
        self.0.is_zero()
    }

    /// All bits of `other` are set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        !(self.0 & other.0).is_zero()
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// The `SUPER_*` bit that lifts the allow-list for `self`'s class, if the class has one.
    pub fn super_of(self) -> Option<Self> {
        match self {
            p if p == Self::TRANSFERVALUE => Some(Self::SUPER_TRANSFERVALUE),
            p if p == Self::CALL => Some(Self::SUPER_CALL),
            p if p == Self::STATICCALL => Some(Self::SUPER_STATICCALL),
            p if p == Self::DELEGATECALL => Some(Self::SUPER_DELEGATECALL),
            _ => None,
        }
    }

    /// Name of a single named bit.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED.iter().find(|(_, p)| *p == self).map(|(name, _)| *name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, p)| *p)
    }

    /// Names of the named bits present in `self`, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(_, p)| self.contains(*p))
            .map(|(name, _)| name)
    }
}

impl BitOr for PermissionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for PermissionSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PermissionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for PermissionSet {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<B256> for PermissionSet {
    fn from(word: B256) -> Self {
        Self::from_word(word)
    }
}

impl From<PermissionSet> for B256 {
    fn from(permissions: PermissionSet) -> Self {
        permissions.to_word()
    }
}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PermissionSet(")?;
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            write!(f, "{:#x}", self.0)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_word())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn bit_values_match_the_standard() {
        assert_eq!(PermissionSet::CALL.as_u256(), U256::from(0x800u64));
        assert_eq!(PermissionSet::SETDATA.as_u256(), U256::from(0x40000u64));
        assert_eq!(PermissionSet::EXECUTE_RELAY_CALL.as_u256(), U256::from(0x400000u64));
        assert_eq!(
            PermissionSet::CALL.to_word(),
            b256!("0000000000000000000000000000000000000000000000000000000000000800")
        );
    }

    #[test]
    fn all_permissions_excludes_sensitive_bits() {
        let all = PermissionSet::ALL_PERMISSIONS;
        assert!(!all.contains(PermissionSet::REENTRANCY));
        assert!(!all.contains(PermissionSet::DELEGATECALL));
        assert!(!all.contains(PermissionSet::SUPER_DELEGATECALL));
        for (name, bit) in PermissionSet::NAMED {
            if !matches!(name, "REENTRANCY" | "DELEGATECALL" | "SUPER_DELEGATECALL") {
                assert!(all.contains(bit), "{name} missing from ALL_PERMISSIONS");
            }
        }
    }

    #[test]
    fn super_bit_does_not_imply_base_bit() {
        let granted = PermissionSet::SUPER_CALL;
        assert!(!granted.contains(PermissionSet::CALL));
        assert_eq!(PermissionSet::CALL.super_of(), Some(PermissionSet::SUPER_CALL));
        assert_eq!(PermissionSet::SETDATA.super_of(), None);
        assert_eq!(PermissionSet::DEPLOY.super_of(), None);
    }

    #[test]
    fn stored_values_are_padded_not_rejected() {
        assert_eq!(PermissionSet::from_stored_value(&[]), PermissionSet::NONE);
        assert_eq!(PermissionSet::from_stored_value(&[0x08, 0x00]), PermissionSet::CALL);
        let mut long = [0u8; 40];
        long[31] = 0x01;
        long[39] = 0xff;
        assert_eq!(PermissionSet::from_stored_value(&long), PermissionSet::CHANGEOWNER);
    }

    #[test]
    fn names_round_trip() {
        let set = PermissionSet::CALL | PermissionSet::TRANSFERVALUE;
        assert_eq!(set.names().collect::<Vec<_>>(), ["TRANSFERVALUE", "CALL"]);
        assert_eq!(PermissionSet::from_name("execute_relay_call"), Some(PermissionSet::EXECUTE_RELAY_CALL));
        assert_eq!(PermissionSet::SIGN.name(), Some("SIGN"));
        assert_eq!(set.name(), None);
        assert_eq!(format!("{set:?}"), "PermissionSet(TRANSFERVALUE | CALL)");
    }
}
