//! Reentrancy detection for requests forwarded to the account.
//!
//! Only one non-`setData` request may be in flight at a time. A controller calling back
//! into the key manager from inside that request needs the `REENTRANCY` permission.

use std::cell::Cell;

use tracing::trace;

/// In-flight flag of the key manager.
///
/// Set while a non-`setData` request is being forwarded to the account. A request arriving
/// while it is set is a reentrant one.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    in_flight: Cell<bool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Enter a request. `acquire` sets the flag if it is clear; the returned token clears it
    /// again on drop, on every exit path.
    pub fn enter(&self, acquire: bool) -> ReentrancyToken<'_> {
        let reentrant = self.in_flight.get();
        let owns = acquire && !reentrant;
        if owns {
            self.in_flight.set(true);
        }
        trace!(reentrant, owns, "key manager entered");
        ReentrancyToken {
            guard: self,
            reentrant,
            owns,
        }
    }
}

#[must_use = "the flag is released when the token is dropped"]
pub struct ReentrancyToken<'a> {
    guard: &'a ReentrancyGuard,
    reentrant: bool,
    owns: bool,
}

impl ReentrancyToken<'_> {
    /// Another request was already in flight when this one entered.
    pub fn is_reentrant(&self) -> bool {
        self.reentrant
    }
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        if self.owns {
            self.guard.in_flight.set(false);
        }
    }
}
