//! Protocol constants mirrored from LSP6 / LSP14 / LSP25.

use alloy_primitives::FixedBytes;

// LSP25 execute relay call: first word of every signed message.
pub const LSP25_VERSION: u64 = 25;

// ERC1271 return values.
pub const ERC1271_SUCCESS_VALUE: FixedBytes<4> = FixedBytes::new([0x16, 0x26, 0xba, 0x7e]);
pub const ERC1271_FAILURE_VALUE: FixedBytes<4> = FixedBytes::new([0xff, 0xff, 0xff, 0xff]);

// LSP14 two-step renounce, in blocks.
pub const RENOUNCE_OWNERSHIP_CONFIRMATION_DELAY: u64 = 200;
pub const RENOUNCE_OWNERSHIP_CONFIRMATION_PERIOD: u64 = 200;

/// Length of an `r ‖ s ‖ v` signature.
pub const SIGNATURE_LEN: usize = 65;
