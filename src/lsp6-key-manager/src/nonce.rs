//! LSP25 multi-channel relay nonces.
//!
//! A nonce word is `channelId (u128) ‖ sequence (u128)`. Channels are independent, so
//! signatures on different channels can be executed in any order while those sharing a
//! channel execute strictly in sequence.

use std::{cell::RefCell, collections::HashMap};

use alloy_primitives::{Address, U256};
use tracing::{trace, warn};

use crate::utils::bytes::{join_word, split_word};

/// Next expected sequence per `(signer, channel)`.
#[derive(Debug, Default)]
pub struct NonceManager {
    sequences: RefCell<HashMap<(Address, u128), u128>>,
}

/// Saved nonce state, restored when a batch fails.
#[derive(Clone, Debug)]
pub struct NonceSnapshot(HashMap<(Address, u128), u128>);

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn sequence(&self, from: Address, channel: u128) -> u128 {
        self.sequences.borrow().get(&(from, channel)).copied().unwrap_or_default()
    }

    /// The nonce `from` must sign with next on `channel`.
    pub fn get_nonce(&self, from: Address, channel: u128) -> U256 {
        join_word(channel, self.sequence(from, channel))
    }

    pub fn is_valid_nonce(&self, from: Address, nonce: U256) -> bool {
        let (channel, sequence) = split_word(nonce);
        self.sequence(from, channel) == sequence
    }

    /// Consume `nonce`. Only call after [`Self::is_valid_nonce`] accepted it.
    ///
    /// The last sequence of a channel is never consumed, so the channel stays pinned there
    /// instead of wrapping back to zero.
    pub fn use_nonce(&self, from: Address, nonce: U256) {
        let (channel, sequence) = split_word(nonce);
        let Some(next) = sequence.checked_add(1) else {
            warn!(%from, channel, "relay channel exhausted");
            return;
        };
        trace!(%from, channel, sequence, "relay nonce consumed");
        self.sequences.borrow_mut().insert((from, channel), next);
    }

    pub fn snapshot(&self) -> NonceSnapshot {
        NonceSnapshot(self.sequences.borrow().clone())
    }

    pub fn restore(&self, snapshot: NonceSnapshot) {
        *self.sequences.borrow_mut() = snapshot.0;
    }
}
