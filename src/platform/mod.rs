//! Platform capability detection.
//!
//! Answers the two questions the XOR dispatcher asks about the machine it runs on:
//! is there a native wide XOR instruction, and may native words be loaded from
//! unaligned addresses without penalty.
//!
//! # Detection
//! - With `std`: runtime detection (`is_x86_feature_detected!` / `is_aarch64_feature_detected!`),
//!   performed once and cached in a `OnceLock`.
//! - Without `std`: compile-time target features only, cached in an atomic.
//! - Under Miri: portable capabilities, so the interpreter never sees an intrinsic.
//!
//! # Overrides
//! [`set_caps_override`] replaces the detected value process-wide. An override can only
//! narrow what the hardware offers; claiming an instruction set the CPU lacks is ignored.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

/// Targets on which a misaligned `usize` load is legal and cheap.
const UNALIGNED_WORDS: bool = cfg!(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "powerpc64",
    target_arch = "s390x",
));

const BIT_SSE2: u8 = 1 << 0;
const BIT_AVX2: u8 = 1 << 1;
const BIT_NEON: u8 = 1 << 2;
const BIT_UNALIGNED: u8 = 1 << 3;
/// Marks a cache slot as populated.
const BIT_SET: u8 = 1 << 7;

/// CPU capabilities relevant to bulk XOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caps {
    /// 128-bit x86 integer SIMD (baseline on x86_64).
    pub sse2: bool,
    /// 256-bit x86 integer SIMD.
    pub avx2: bool,
    /// 128-bit AArch64 Advanced SIMD (baseline on aarch64).
    pub neon: bool,
    /// Misaligned native-word loads are tolerated by the hardware.
    pub unaligned_words: bool,
}

impl Caps {
    /// No SIMD and strict alignment: the most conservative machine.
    pub const PORTABLE: Caps = Caps {
        sse2: false,
        avx2: false,
        neon: false,
        unaligned_words: false,
    };

    /// True when a native vector XOR instruction is available.
    pub fn vector_xor(&self) -> bool {
        self.sse2 || self.avx2 || self.neon
    }

    /// Width in bytes of the widest available vector XOR, `0` if none.
    pub fn vector_width(&self) -> usize {
        if self.avx2 {
            32
        } else if self.sse2 || self.neon {
            16
        } else {
            0
        }
    }

    /// Drops every instruction set that `hardware` does not report.
    ///
    /// `unaligned_words` is kept as requested: the word path never relies on it for
    /// memory safety, only for speed.
    pub fn narrowed_to(self, hardware: Caps) -> Caps {
        Caps {
            sse2: self.sse2 && hardware.sse2,
            avx2: self.avx2 && hardware.avx2,
            neon: self.neon && hardware.neon,
            unaligned_words: self.unaligned_words,
        }
    }

    fn to_bits(self) -> u8 {
        let mut bits = BIT_SET;
        if self.sse2 {
            bits |= BIT_SSE2;
        }
        if self.avx2 {
            bits |= BIT_AVX2;
        }
        if self.neon {
            bits |= BIT_NEON;
        }
        if self.unaligned_words {
            bits |= BIT_UNALIGNED;
        }
        bits
    }

    fn from_bits(bits: u8) -> Caps {
        Caps {
            sse2: bits & BIT_SSE2 != 0,
            avx2: bits & BIT_AVX2 != 0,
            neon: bits & BIT_NEON != 0,
            unaligned_words: bits & BIT_UNALIGNED != 0,
        }
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simd = if self.avx2 {
            "avx2"
        } else if self.sse2 {
            "sse2"
        } else if self.neon {
            "neon"
        } else {
            "none"
        };
        write!(
            f,
            "simd={} unaligned_words={} word_size={}",
            simd,
            self.unaligned_words,
            core::mem::size_of::<usize>()
        )
    }
}

static OVERRIDE: AtomicU8 = AtomicU8::new(0);

/// Capabilities the dispatcher should use: the override if one is set, the detected
/// hardware otherwise.
pub fn caps() -> Caps {
    let bits = OVERRIDE.load(Ordering::Acquire);
    if bits & BIT_SET != 0 {
        return Caps::from_bits(bits);
    }
    detected()
}

/// Installs (`Some`) or clears (`None`) a process-wide capability override.
///
/// The override is narrowed to the detected hardware before it is stored.
pub fn set_caps_override(value: Option<Caps>) {
    match value {
        Some(requested) => {
            let effective = requested.narrowed_to(detected());
            if effective != requested {
                log::warn!(
                    "Capability override narrowed to hardware: requested [{}], using [{}]",
                    requested,
                    effective
                );
            } else {
                log::info!("Capability override installed: [{}]", effective);
            }
            OVERRIDE.store(effective.to_bits(), Ordering::Release);
        }
        None => OVERRIDE.store(0, Ordering::Release),
    }
}

/// Capabilities of the hardware, ignoring any override.
#[cfg(feature = "std")]
pub fn detected() -> Caps {
    static DETECTED: std::sync::OnceLock<Caps> = std::sync::OnceLock::new();
    *DETECTED.get_or_init(|| {
        let caps = detect();
        log::debug!("Detected XOR capabilities: {}", caps);
        caps
    })
}

/// Capabilities of the hardware, ignoring any override.
#[cfg(not(feature = "std"))]
pub fn detected() -> Caps {
    static DETECTED: AtomicU8 = AtomicU8::new(0);
    let bits = DETECTED.load(Ordering::Acquire);
    if bits & BIT_SET != 0 {
        return Caps::from_bits(bits);
    }
    // Detection is pure, so racing initializers store the same value.
    let caps = detect();
    log::debug!("Detected XOR capabilities: {}", caps);
    DETECTED.store(caps.to_bits(), Ordering::Release);
    caps
}

fn detect() -> Caps {
    if cfg!(miri) {
        return Caps {
            unaligned_words: UNALIGNED_WORDS,
            ..Caps::PORTABLE
        };
    }

    #[cfg(all(feature = "std", target_arch = "x86_64"))]
    let (sse2, avx2) = (
        std::arch::is_x86_feature_detected!("sse2"),
        std::arch::is_x86_feature_detected!("avx2"),
    );
    #[cfg(all(not(feature = "std"), target_arch = "x86_64"))]
    let (sse2, avx2) = (cfg!(target_feature = "sse2"), cfg!(target_feature = "avx2"));
    #[cfg(not(target_arch = "x86_64"))]
    let (sse2, avx2) = (false, false);

    #[cfg(all(feature = "std", target_arch = "aarch64"))]
    let neon = std::arch::is_aarch64_feature_detected!("neon");
    #[cfg(all(not(feature = "std"), target_arch = "aarch64"))]
    let neon = cfg!(target_feature = "neon");
    #[cfg(not(target_arch = "aarch64"))]
    let neon = false;

    Caps {
        sse2,
        avx2,
        neon,
        unaligned_words: UNALIGNED_WORDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_stable() {
        assert_eq!(detected(), detected());
        assert_eq!(detected().unaligned_words, UNALIGNED_WORDS);
    }

    #[test]
    #[cfg(all(target_arch = "x86_64", not(miri)))]
    fn test_x86_64_has_sse2_baseline() {
        assert!(detected().sse2);
        assert!(detected().vector_xor());
        assert!(detected().vector_width() >= 16);
    }

    #[test]
    fn test_bits_roundtrip_every_combination() {
        for raw in 0u8..16 {
            let caps = Caps::from_bits(raw);
            assert_eq!(Caps::from_bits(caps.to_bits()), caps);
            assert_ne!(caps.to_bits() & BIT_SET, 0);
        }
    }

    #[test]
    fn test_narrowing_never_adds_simd() {
        let everything = Caps {
            sse2: true,
            avx2: true,
            neon: true,
            unaligned_words: true,
        };
        let narrowed = everything.narrowed_to(Caps::PORTABLE);
        assert!(!narrowed.vector_xor());
        assert_eq!(narrowed.vector_width(), 0);
        assert!(narrowed.unaligned_words);
    }

    #[test]
    fn test_override_set_and_clear() {
        set_caps_override(Some(Caps::PORTABLE));
        assert_eq!(caps(), Caps::PORTABLE);
        set_caps_override(None);
        assert_eq!(caps(), detected());
    }

    #[test]
    fn test_display_names_widest_simd() {
        let caps = Caps {
            sse2: true,
            avx2: true,
            ..Caps::PORTABLE
        };
        let shown = format!("{}", caps);
        assert!(shown.starts_with("simd=avx2"));
    }
}
