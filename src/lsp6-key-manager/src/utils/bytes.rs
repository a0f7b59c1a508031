//! Splitting and joining 256-bit words made of two packed `u128` halves.
//!
//! Relay nonces (`channel ‖ sequence`) and validity timestamps (`start ‖ end`) both use this
//! layout.

use alloy_primitives::U256;

/// `(high, low)` halves of a word.
pub fn split_word(word: U256) -> (u128, u128) {
    let limbs = word.as_limbs();
    let low = (u128::from(limbs[1]) << 64) | u128::from(limbs[0]);
    let high = (u128::from(limbs[3]) << 64) | u128::from(limbs[2]);
    (high, low)
}

pub fn join_word(high: u128, low: u128) -> U256 {
    U256::from_limbs([low as u64, (low >> 64) as u64, high as u64, (high >> 64) as u64])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_packed_halves() {
        let word = (U256::from(3u64) << 128) | U256::from(u128::MAX);
        assert_eq!(split_word(word), (3, u128::MAX));
        assert_eq!(join_word(3, u128::MAX), word);
        assert_eq!(split_word(U256::ZERO), (0, 0));
    }
}
