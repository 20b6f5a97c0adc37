//! Configuration for the XOR engine.
//!
//! The defaults pick the fastest correct path for the running machine; the knobs exist
//! for benchmarking and for pinning a path in tests.

use crate::engine::Strategy;

/// Settings consumed by [`XorEngine`](crate::engine::XorEngine).
///
/// Populated by the host application and passed to
/// [`XorEngine::with_config`](crate::engine::XorEngine::with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorConfig {
    /// Allow the vector path when the platform reports a SIMD XOR.
    pub allow_vector: bool,

    /// Allow the word-at-a-time path.
    pub allow_words: bool,

    /// Trust the platform's unaligned-access allow-list. When false, the word path is
    /// only taken if all three buffers are word-aligned.
    pub trust_unaligned: bool,

    /// Pin every call to one strategy, bypassing the dispatcher.
    /// Every strategy is correct on every target; this only changes speed.
    pub force: Option<Strategy>,
}

impl XorConfig {
    /// Configuration that always uses `strategy`.
    pub fn forced(strategy: Strategy) -> Self {
        Self {
            force: Some(strategy),
            ..Self::default()
        }
    }
}

impl Default for XorConfig {
    fn default() -> Self {
        Self {
            allow_vector: true,
            allow_words: true,
            trust_unaligned: true,
            force: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_every_path() {
        let cfg = XorConfig::default();
        assert!(cfg.allow_vector);
        assert!(cfg.allow_words);
        assert!(cfg.trust_unaligned);
        assert_eq!(cfg.force, None);
    }

    #[test]
    fn test_forced_keeps_other_defaults() {
        let cfg = XorConfig::forced(Strategy::Words);
        assert_eq!(cfg.force, Some(Strategy::Words));
        assert!(cfg.allow_vector);
    }
}
