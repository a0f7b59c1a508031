//! LSP14 two-step ownership with a time-delayed renounce.
//!
//! ```text
//! Active ──renounce──▶ RenounceStarted(at) ──delay──▶ confirmable ──renounce──▶ owner = 0
//!                             ▲                            │
//!                             └──── renounce after period ─┘
//! ```

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{RENOUNCE_OWNERSHIP_CONFIRMATION_DELAY, RENOUNCE_OWNERSHIP_CONFIRMATION_PERIOD},
    errors::OwnershipError,
};

/// Renounce timing, in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenounceConfig {
    /// Blocks to wait after the first call before the second one is honoured.
    pub delay: u64,
    /// Blocks during which the second call is honoured.
    pub period: u64,
}

impl Default for RenounceConfig {
    fn default() -> Self {
        Self {
            delay: RENOUNCE_OWNERSHIP_CONFIRMATION_DELAY,
            period: RENOUNCE_OWNERSHIP_CONFIRMATION_PERIOD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnershipEvent {
    TransferStarted {
        previous_owner: Address,
        new_owner: Address,
    },
    Transferred {
        previous_owner: Address,
        new_owner: Address,
    },
    RenounceStarted,
    Renounced,
}

#[derive(Clone, Debug)]
pub struct Ownership {
    account: Address,
    owner: Address,
    pending_owner: Option<Address>,
    renounce_started_at: Option<u64>,
    config: RenounceConfig,
    events: Vec<OwnershipEvent>,
}

impl Ownership {
    pub fn new(account: Address, owner: Address, config: RenounceConfig) -> Self {
        Self {
            account,
            owner,
            pending_owner: None,
            renounce_started_at: None,
            config,
            events: Vec::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.pending_owner
    }

    pub fn renounce_started_at(&self) -> Option<u64> {
        self.renounce_started_at
    }

    pub fn events(&self) -> &[OwnershipEvent] {
        &self.events
    }

    fn only_owner(&self, caller: Address) -> Result<(), OwnershipError> {
        if caller != self.owner {
            return Err(OwnershipError::CallerNotTheOwner(caller));
        }
        Ok(())
    }

    /// First step of a transfer: `new_owner` becomes pending until it accepts.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), OwnershipError> {
        self.only_owner(caller)?;
        if new_owner == self.account {
            return Err(OwnershipError::CannotTransferOwnershipToSelf);
        }
        self.pending_owner = Some(new_owner);
        self.renounce_started_at = None;
        self.events.push(OwnershipEvent::TransferStarted {
            previous_owner: self.owner,
            new_owner,
        });
        Ok(())
    }

    pub fn accept_ownership(&mut self, caller: Address) -> Result<(), OwnershipError> {
        if self.pending_owner != Some(caller) {
            return Err(OwnershipError::CallerNotPendingOwner(caller));
        }
        let previous_owner = self.owner;
        self.set_owner(caller);
        self.events.push(OwnershipEvent::Transferred {
            previous_owner,
            new_owner: caller,
        });
        Ok(())
    }

    /// Two-call renounce. The second call must land in
    /// `[started + delay, started + delay + period]`; later calls start over.
    pub fn renounce_ownership(
        &mut self,
        caller: Address,
        block_number: u64,
    ) -> Result<(), OwnershipError> {
        self.only_owner(caller)?;

        let Some(started_at) = self.renounce_started_at else {
            self.start_renounce(block_number);
            return Ok(());
        };
        let start = started_at.saturating_add(self.config.delay);
        let end = start.saturating_add(self.config.period);

        if block_number > end {
            self.start_renounce(block_number);
            return Ok(());
        }
        if block_number < start {
            return Err(OwnershipError::NotInRenounceOwnershipInterval { start, end });
        }

        let previous_owner = self.owner;
        self.set_owner(Address::ZERO);
        self.events.push(OwnershipEvent::Transferred {
            previous_owner,
            new_owner: Address::ZERO,
        });
        self.events.push(OwnershipEvent::Renounced);
        Ok(())
    }

    fn start_renounce(&mut self, block_number: u64) {
        self.renounce_started_at = Some(block_number);
        self.pending_owner = None;
        self.events.push(OwnershipEvent::RenounceStarted);
    }

    fn set_owner(&mut self, owner: Address) {
        self.owner = owner;
        self.pending_owner = None;
        self.renounce_started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ACCOUNT: Address = address!("acc0acc0acc0acc0acc0acc0acc0acc0acc0acc0");
    const OWNER: Address = address!("0000000000000000000000000000000000000001");
    const NEXT: Address = address!("0000000000000000000000000000000000000002");

    fn ownership() -> Ownership {
        Ownership::new(ACCOUNT, OWNER, RenounceConfig::default())
    }

    #[test]
    fn two_step_transfer() {
        let mut o = ownership();
        o.transfer_ownership(OWNER, NEXT).unwrap();
        assert_eq!(o.owner(), OWNER);
        assert_eq!(o.pending_owner(), Some(NEXT));
        assert_eq!(o.accept_ownership(OWNER), Err(OwnershipError::CallerNotPendingOwner(OWNER)));
        o.accept_ownership(NEXT).unwrap();
        assert_eq!(o.owner(), NEXT);
        assert_eq!(o.pending_owner(), None);
    }

    #[test]
    fn only_owner_can_transfer() {
        let mut o = ownership();
        assert_eq!(o.transfer_ownership(NEXT, NEXT), Err(OwnershipError::CallerNotTheOwner(NEXT)));
        assert_eq!(
            o.transfer_ownership(OWNER, ACCOUNT),
            Err(OwnershipError::CannotTransferOwnershipToSelf)
        );
    }

    #[test]
    fn renounce_requires_waiting_for_the_window() {
        let mut o = ownership();
        o.renounce_ownership(OWNER, 1_000).unwrap();
        assert_eq!(o.renounce_started_at(), Some(1_000));
        assert_eq!(
            o.renounce_ownership(OWNER, 1_100),
            Err(OwnershipError::NotInRenounceOwnershipInterval { start: 1_200, end: 1_400 })
        );
        o.renounce_ownership(OWNER, 1_200).unwrap();
        assert_eq!(o.owner(), Address::ZERO);
        assert_eq!(o.events().last(), Some(&OwnershipEvent::Renounced));
    }

    #[test]
    fn renounce_after_the_window_starts_over() {
        let mut o = ownership();
        o.renounce_ownership(OWNER, 10).unwrap();
        o.renounce_ownership(OWNER, 411).unwrap();
        assert_eq!(o.owner(), OWNER);
        assert_eq!(o.renounce_started_at(), Some(411));
        assert_eq!(
            o.events(),
            &[OwnershipEvent::RenounceStarted, OwnershipEvent::RenounceStarted]
        );
    }

    #[test]
    fn renounce_cancels_pending_transfer() {
        let mut o = ownership();
        o.transfer_ownership(OWNER, NEXT).unwrap();
        o.renounce_ownership(OWNER, 0).unwrap();
        assert_eq!(o.pending_owner(), None);
        assert_eq!(o.accept_ownership(NEXT), Err(OwnershipError::CallerNotPendingOwner(NEXT)));
    }

    #[test]
    fn config_deserialises_with_defaults() {
        let config: RenounceConfig = serde_json::from_str(r#"{"delay": 5}"#).unwrap();
        assert_eq!(config, RenounceConfig { delay: 5, period: 200 });
    }
}
