use alloy_primitives::U256;

/// ERC725X operation types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationType {
    Call = 0,
    Create = 1,
    Create2 = 2,
    StaticCall = 3,
    DelegateCall = 4,
}

impl OperationType {
    pub const fn is_contract_creation(self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
            Self::StaticCall => "STATICCALL",
            Self::DelegateCall => "DELEGATECALL",
        }
    }
}

impl TryFrom<u8> for OperationType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use OperationType::*;
        let op = match value {
            0 => Call,
            1 => Create,
            2 => Create2,
            3 => StaticCall,
            4 => DelegateCall,
            _ => return Err(()),
        };
        Ok(op)
    }
}

impl TryFrom<U256> for OperationType {
    type Error = ();

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        u8::try_from(value).map_err(|_| ()).and_then(Self::try_from)
    }
}

impl From<OperationType> for U256 {
    fn from(op: OperationType) -> Self {
        Self::from(op as u8)
    }
}
