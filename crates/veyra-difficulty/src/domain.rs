//! Difficulty target adjustment.
//!
//! A target is a ceiling: a larger `T` is easier (more hashes satisfy it),
//! a smaller `T` is harder.

use primitive_types::U256;

/// Adjustment parameters.
#[derive(Clone, Debug)]
pub struct DifficultyConfig {
    /// Number of trailing block intervals averaged per adjustment.
    pub window: usize,
    /// Target time between blocks, in milliseconds.
    pub target_interval_ms: u64,
    /// Genesis difficulty target.
    pub base_difficulty: U256,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            window: 100,
            target_interval_ms: 3_000,
            base_difficulty: U256::from(2_500_000u64),
        }
    }
}

/// Computes the next difficulty target from a trailing window of block
/// intervals.
#[derive(Clone)]
pub struct DifficultyAdjuster {
    config: DifficultyConfig,
}

impl DifficultyAdjuster {
    #[must_use]
    pub fn new(config: DifficultyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// `T_new = clamp(T_old * ratio, T_old/4, T_old*4)` where
    /// `ratio = observedMeanInterval / targetInterval`, computed over the
    /// most recent `window` intervals. Unchanged until the window fills.
    /// `trailing_intervals_ms` holds inter-block gaps, oldest to newest.
    #[must_use]
    pub fn next_difficulty(&self, current: U256, trailing_intervals_ms: &[u64]) -> U256 {
        if trailing_intervals_ms.len() < self.config.window {
            return current;
        }
        let recent = &trailing_intervals_ms[trailing_intervals_ms.len() - self.config.window..];
        let sum: u128 = recent.iter().map(|&v| u128::from(v)).sum();
        let mean_ms = (sum / recent.len() as u128) as u64;

        let target = self.config.target_interval_ms.max(1);
        let candidate = current.saturating_mul(U256::from(mean_ms)) / U256::from(target);
        self.clamp_to_quarter_bounds(current, candidate)
    }

    fn clamp_to_quarter_bounds(&self, old: U256, candidate: U256) -> U256 {
        let floor = old / U256::from(4u64);
        let ceiling = old.saturating_mul(U256::from(4u64));
        candidate.clamp(floor, ceiling)
    }
}

/// Turns ascending block timestamps into the inter-block gaps the adjuster
/// consumes.
#[must_use]
pub fn intervals_from_timestamps(timestamps_ms: &[u64]) -> Vec<u64> {
    timestamps_ms
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjuster(window: usize) -> DifficultyAdjuster {
        DifficultyAdjuster::new(DifficultyConfig {
            window,
            target_interval_ms: 3_000,
            base_difficulty: U256::from(2_500_000u64),
        })
    }

    #[test]
    fn difficulty_unchanged_before_window_fills() {
        let adj = adjuster(100);
        let current = U256::from(1_000_000u64);
        let intervals = vec![3_000u64; 10];
        assert_eq!(adj.next_difficulty(current, &intervals), current);
    }

    #[test]
    fn fast_blocks_lower_the_target() {
        let adj = adjuster(10);
        let current = U256::from(1_000_000u64);
        // Blocks arriving in 1500ms instead of the 3000ms target.
        let intervals = vec![1_500u64; 10];
        let next = adj.next_difficulty(current, &intervals);
        assert!(next < current, "fast blocks should lower the target");
    }

    #[test]
    fn slow_blocks_raise_the_target() {
        let adj = adjuster(10);
        let current = U256::from(1_000_000u64);
        // Blocks arriving in 6000ms instead of the 3000ms target.
        let intervals = vec![6_000u64; 10];
        let next = adj.next_difficulty(current, &intervals);
        assert!(next > current, "slow blocks should raise the target");
    }

    #[test]
    fn adjustment_is_clamped_to_quarter_bounds() {
        let adj = adjuster(10);
        let current = U256::from(1_000_000u64);
        // Blocks 100x too fast: unclamped ratio would crush the target.
        let intervals = vec![30u64; 10];
        let next = adj.next_difficulty(current, &intervals);
        assert_eq!(next, current / U256::from(4u64));
    }

    #[test]
    fn intervals_from_timestamps_computes_consecutive_gaps() {
        let timestamps = vec![1_000u64, 4_000, 7_500];
        assert_eq!(intervals_from_timestamps(&timestamps), vec![3_000, 3_500]);
    }
}
