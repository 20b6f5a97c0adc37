//! Bulk XOR engine.
//!
//! Computes `dst[i] = a[i] ^ b[i]` over byte buffers, choosing per call between three
//! interchangeable paths that always produce bit-identical output.
//!
//! # Components
//! - `bytes`: byte-at-a-time loop. Always correct, slowest.
//! - `words`: native-word (`usize`) chunks with a byte tail.
//! - `vector`: wide SIMD XOR over raw addresses (AVX2/SSE2, NEON, or a portable chunk loop).
//!
//! # Dispatch
//! 1. A SIMD XOR is available: vector path.
//! 2. The target tolerates unaligned word access: word path.
//! 3. `dst`, `a` and `b` all start on a word boundary: word path.
//! 4. Otherwise: byte path.
//!
//! # Aliasing
//! The destination may be the same buffer as a source ([`xor_in_place`]). Partial overlap
//! at a different offset is unsupported; safe borrows cannot express it.

mod bytes;
mod vector;
mod words;

use core::fmt;

use crate::config::XorConfig;
use crate::platform::{self, Caps};

/// Native word size in bytes (4 or 8).
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();

/// Precondition violations reported at the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XorError {
    /// Destination shorter than the number of bytes to write.
    InsufficientCapacity { needed: usize, available: usize },
    /// Equal-length XOR called with sources of different lengths.
    LengthMismatch { a: usize, b: usize },
}

impl fmt::Display for XorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XorError::InsufficientCapacity { needed, available } => write!(
                f,
                "Destination too small: need {} bytes, have {}",
                needed, available
            ),
            XorError::LengthMismatch { a, b } => {
                write!(f, "Source length mismatch: {} vs {} bytes", a, b)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for XorError {}

/// The three XOR implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Bytes,
    Words,
    Vector,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Bytes, Strategy::Words, Strategy::Vector];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Bytes => "bytes",
            Strategy::Words => "words",
            Strategy::Vector => "vector",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed operands of one call, all exactly the same length.
pub(crate) enum Operands<'a> {
    /// `dst = a ^ b` with a separate destination.
    Split {
        dst: &'a mut [u8],
        a: &'a [u8],
        b: &'a [u8],
    },
    /// `dst ^= b`, i.e. the destination doubles as source `a`.
    InPlace { dst: &'a mut [u8], b: &'a [u8] },
}

impl<'a> Operands<'a> {
    /// Truncates every operand to `n` bytes. Caller checks `n` against all lengths.
    fn split(dst: &'a mut [u8], a: &'a [u8], b: &'a [u8], n: usize) -> Self {
        Operands::Split {
            dst: &mut dst[..n],
            a: &a[..n],
            b: &b[..n],
        }
    }

    fn in_place(dst: &'a mut [u8], b: &'a [u8], n: usize) -> Self {
        Operands::InPlace {
            dst: &mut dst[..n],
            b: &b[..n],
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Operands::Split { dst, .. } | Operands::InPlace { dst, .. } => dst.len(),
        }
    }

    fn is_word_aligned(&self) -> bool {
        match self {
            Operands::Split { dst, a, b } => {
                word_aligned(dst.as_ptr()) && word_aligned(a.as_ptr()) && word_aligned(b.as_ptr())
            }
            Operands::InPlace { dst, b } => word_aligned(dst.as_ptr()) && word_aligned(b.as_ptr()),
        }
    }
}

#[inline(always)]
fn word_aligned(ptr: *const u8) -> bool {
    ptr as usize % WORD_SIZE == 0
}

/// XOR dispatcher bound to a configuration and a capability snapshot.
#[derive(Debug, Clone, Copy)]
pub struct XorEngine {
    config: XorConfig,
    caps: Caps,
}

impl Default for XorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XorEngine {
    /// Engine with the default configuration and the current platform capabilities.
    pub fn new() -> Self {
        Self::with_config(XorConfig::default())
    }

    pub fn with_config(config: XorConfig) -> Self {
        Self {
            config,
            caps: platform::caps(),
        }
    }

    /// Engine that dispatches as if running on `caps`, narrowed to the real hardware.
    pub fn with_caps(config: XorConfig, caps: Caps) -> Self {
        Self {
            config,
            caps: caps.narrowed_to(platform::detected()),
        }
    }

    pub fn config(&self) -> &XorConfig {
        &self.config
    }

    pub fn caps(&self) -> Caps {
        self.caps
    }

    /// Bounded XOR: writes `min(a.len(), b.len())` bytes into `dst` and returns that count.
    ///
    /// Bytes of `dst` past the count are left untouched. Fails with
    /// [`XorError::InsufficientCapacity`] if `dst` is shorter than the count.
    pub fn xor_bytes(&self, dst: &mut [u8], a: &[u8], b: &[u8]) -> Result<usize, XorError> {
        let n = a.len().min(b.len());
        if dst.len() < n {
            return Err(capacity_error(n, dst.len()));
        }
        if n == 0 {
            return Ok(0);
        }
        self.run(Operands::split(dst, a, b, n));
        Ok(n)
    }

    /// Equal-length XOR: writes exactly `b.len()` bytes into `dst`.
    ///
    /// Fails with [`XorError::LengthMismatch`] if `a` and `b` differ in length and with
    /// [`XorError::InsufficientCapacity`] if `dst` is shorter than `b`.
    pub fn xor_words(&self, dst: &mut [u8], a: &[u8], b: &[u8]) -> Result<(), XorError> {
        if a.len() != b.len() {
            log::warn!("xor_words called with sources of {} and {} bytes", a.len(), b.len());
            return Err(XorError::LengthMismatch {
                a: a.len(),
                b: b.len(),
            });
        }
        let n = b.len();
        if dst.len() < n {
            return Err(capacity_error(n, dst.len()));
        }
        if n > 0 {
            self.run(Operands::split(dst, a, b, n));
        }
        Ok(())
    }

    /// In-place XOR (`buf ^= b`) over `min(buf.len(), b.len())` bytes; returns that count.
    pub fn xor_in_place(&self, buf: &mut [u8], b: &[u8]) -> Result<usize, XorError> {
        let n = buf.len().min(b.len());
        if n > 0 {
            self.run(Operands::in_place(buf, b, n));
        }
        Ok(n)
    }

    /// Strategy a bounded XOR over these buffers would use.
    pub fn strategy_for(&self, dst: &[u8], a: &[u8], b: &[u8]) -> Strategy {
        self.choose(|| {
            word_aligned(dst.as_ptr()) && word_aligned(a.as_ptr()) && word_aligned(b.as_ptr())
        })
    }

    fn select(&self, ops: &Operands<'_>) -> Strategy {
        self.choose(|| ops.is_word_aligned())
    }

    /// `aligned` reports whether all operands start on a word boundary. It is only
    /// evaluated when the unaligned allow-list does not apply.
    fn choose(&self, aligned: impl FnOnce() -> bool) -> Strategy {
        if let Some(forced) = self.config.force {
            return forced;
        }
        if self.config.allow_vector && self.caps.vector_xor() {
            return Strategy::Vector;
        }
        let tolerant = self.config.trust_unaligned && self.caps.unaligned_words;
        if self.config.allow_words && (tolerant || aligned()) {
            return Strategy::Words;
        }
        Strategy::Bytes
    }

    fn run(&self, ops: Operands<'_>) {
        let strategy = self.select(&ops);
        log::trace!("xor {} bytes via {}", ops.len(), strategy);
        match strategy {
            Strategy::Bytes => bytes::xor(ops),
            Strategy::Words => words::xor(ops),
            Strategy::Vector => vector::xor(ops, self.caps),
        }
    }
}

fn capacity_error(needed: usize, available: usize) -> XorError {
    log::warn!("XOR destination holds {} bytes, {} required", available, needed);
    XorError::InsufficientCapacity { needed, available }
}

/// Bounded XOR with the default engine. See [`XorEngine::xor_bytes`].
pub fn xor_bytes(dst: &mut [u8], a: &[u8], b: &[u8]) -> Result<usize, XorError> {
    XorEngine::new().xor_bytes(dst, a, b)
}

/// Equal-length XOR with the default engine. See [`XorEngine::xor_words`].
pub fn xor_words(dst: &mut [u8], a: &[u8], b: &[u8]) -> Result<(), XorError> {
    XorEngine::new().xor_words(dst, a, b)
}

/// In-place XOR with the default engine. See [`XorEngine::xor_in_place`].
pub fn xor_in_place(buf: &mut [u8], b: &[u8]) -> Result<usize, XorError> {
    XorEngine::new().xor_in_place(buf, b)
}
