//! Size envelope: the four numbers every size-bounded decision is made against.
//!
//! ## The Problem
//!
//! A single "max chunk size" forces a bad choice at every boundary: stop
//! exactly at the limit (splitting mid-sentence) or keep going past it
//! (unbounded growth). The fix is the same one `ChunkCapacity` used in the
//! old fixed/recursive strategies here: separate the size you're *aiming
//! for* from the size you're *not allowed to exceed*.
//!
//! ```text
//! target = 100, max = 120
//!
//! Chunk at 95 bytes?  Keep accumulating, still under target.
//! Chunk at 110 bytes? Stop here — in the target..=max sweet spot.
//! Chunk at 130 bytes? Must split further — over max.
//! ```
//!
//! ## Parent vs Sub
//!
//! This chunker has two independent size tiers — parent blocks and
//! sub-blocks — each with its own target/max pair, plus an internal cap
//! that keeps targets from drifting arbitrarily high even when the caller
//! asks for huge blocks (spec'd constants: parent target capped at 1280,
//! sub target capped at 320).

/// The four size numbers derived once per `chunk()` call from the caller's
/// `parent_block_size` and `sub_block_size`.
///
/// `*_target` steers greedy accumulation (stop early to stay coherent);
/// `*_max` is the hard ceiling that triggers recursive refinement. All four
/// fields are guaranteed `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEnvelope {
    p_target: usize,
    p_max: usize,
    s_target: usize,
    s_max: usize,
}

/// Internal cap on the parent target: even a caller-supplied
/// `parent_block_size` far above this still only *aims* for this many
/// scalar units before falling back to the hard `p_max` ceiling.
const INTERNAL_PARENT_TARGET: usize = 1280;

/// Internal cap on the sub-block target, analogous to
/// [`INTERNAL_PARENT_TARGET`].
const INTERNAL_SUB_TARGET: usize = 320;

impl SizeEnvelope {
    /// Derive the envelope from user-supplied sizes.
    ///
    /// Zero is clamped up to one rather than rejected, matching the
    /// defensive `max(1, ...)` the original service applies before doing
    /// any chunking — every module downstream gets a non-zero budget to
    /// work with.
    #[must_use]
    pub fn new(parent_block_size: usize, sub_block_size: usize) -> Self {
        let p_max = parent_block_size.max(1);
        let s_max = sub_block_size.max(1);
        Self {
            p_target: p_max.min(INTERNAL_PARENT_TARGET),
            p_max,
            s_target: s_max.min(INTERNAL_SUB_TARGET),
            s_max,
        }
    }

    /// Target size for parent-block greedy accumulation.
    #[must_use]
    pub const fn p_target(&self) -> usize {
        self.p_target
    }

    /// Hard ceiling for a parent block; crossing it triggers refinement.
    #[must_use]
    pub const fn p_max(&self) -> usize {
        self.p_max
    }

    /// Target size for sub-block greedy accumulation.
    #[must_use]
    pub const fn s_target(&self) -> usize {
        self.s_target
    }

    /// Hard ceiling for a sub-block; crossing it triggers an atomic-region
    /// fallback splitter or a further boundary-ladder recursion.
    #[must_use]
    pub const fn s_max(&self) -> usize {
        self.s_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_target_below_internal_ceiling() {
        let env = SizeEnvelope::new(4096, 4096);
        assert_eq!(env.p_target(), INTERNAL_PARENT_TARGET);
        assert_eq!(env.p_max(), 4096);
        assert_eq!(env.s_target(), INTERNAL_SUB_TARGET);
        assert_eq!(env.s_max(), 4096);
    }

    #[test]
    fn test_target_tracks_small_user_size() {
        let env = SizeEnvelope::new(100, 50);
        assert_eq!(env.p_target(), 100);
        assert_eq!(env.s_target(), 50);
    }

    #[test]
    fn test_zero_is_clamped_to_one() {
        let env = SizeEnvelope::new(0, 0);
        assert_eq!(env.p_max(), 1);
        assert_eq!(env.s_max(), 1);
    }

    #[test]
    fn test_defaults_match_spec_example() {
        let env = SizeEnvelope::new(1024, 512);
        assert_eq!(env.p_target(), 1024);
        assert_eq!(env.p_max(), 1024);
        assert_eq!(env.s_target(), 320);
        assert_eq!(env.s_max(), 512);
    }
}
