//! Vector XOR over raw addresses.
//!
//! Kernels work directly on `(dst, a, b, n)` like a hand-written assembly routine: wide
//! unaligned loads, one XOR, one unaligned store per chunk, then a scalar tail. Kernel
//! selection follows the capability snapshot the engine was built with:
//!
//! | Target  | Kernel   | Chunk |
//! |---------|----------|-------|
//! | x86_64  | AVX2     | 32 B  |
//! | x86_64  | SSE2     | 16 B  |
//! | aarch64 | NEON     | 16 B  |
//! | any     | portable | 32 B  |
//!
//! The portable kernel is a fixed-size array loop the compiler auto-vectorizes.

use super::Operands;
use crate::platform::Caps;

/// XORs every byte of `ops` with the widest kernel `caps` allows.
pub(crate) fn xor(ops: Operands<'_>, caps: Caps) {
    let n = ops.len();
    if n == 0 {
        return;
    }
    let (dst, a, b) = match ops {
        Operands::Split { dst, a, b } => (dst.as_mut_ptr(), a.as_ptr(), b.as_ptr()),
        Operands::InPlace { dst, b } => {
            let dst = dst.as_mut_ptr();
            (dst, dst as *const u8, b.as_ptr())
        }
    };
    // SAFETY: every operand is exactly `n > 0` bytes (Operands invariant). `dst` is either
    // disjoint from both sources or identical to `a`. `caps` comes from the engine, which
    // narrows it to the detected hardware.
    unsafe { xor_raw(dst, a, b, n, caps) }
}

/// # Safety
/// - `n > 0`, and `dst`, `a`, `b` are each valid for `n` bytes.
/// - `dst` is disjoint from `a` and `b`, or equal to one of them.
/// - Every instruction set enabled in `caps` is supported by the running CPU.
pub(crate) unsafe fn xor_raw(dst: *mut u8, a: *const u8, b: *const u8, n: usize, caps: Caps) {
    debug_assert!(n > 0);

    #[cfg(target_arch = "x86_64")]
    {
        if caps.avx2 {
            return x86::xor_avx2(dst, a, b, n);
        }
        if caps.sse2 {
            return x86::xor_sse2(dst, a, b, n);
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if caps.neon {
            return arm::xor_neon(dst, a, b, n);
        }
    }

    // only reachable without SIMD on some targets
    let _ = caps;
    xor_portable(dst, a, b, n)
}

/// Scalar XOR of bytes `i..n`.
#[inline(always)]
unsafe fn xor_tail(dst: *mut u8, a: *const u8, b: *const u8, mut i: usize, n: usize) {
    while i < n {
        *dst.add(i) = *a.add(i) ^ *b.add(i);
        i += 1;
    }
}

const PORTABLE_LANES: usize = 32;

unsafe fn xor_portable(dst: *mut u8, a: *const u8, b: *const u8, n: usize) {
    let mut i = 0;
    while i + PORTABLE_LANES <= n {
        let va: [u8; PORTABLE_LANES] = core::ptr::read_unaligned(a.add(i).cast());
        let vb: [u8; PORTABLE_LANES] = core::ptr::read_unaligned(b.add(i).cast());
        let mut out = [0u8; PORTABLE_LANES];
        for k in 0..PORTABLE_LANES {
            out[k] = va[k] ^ vb[k];
        }
        core::ptr::write_unaligned(dst.add(i).cast(), out);
        i += PORTABLE_LANES;
    }
    xor_tail(dst, a, b, i, n);
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use core::arch::x86_64::{
        __m128i, __m256i, _mm256_loadu_si256, _mm256_storeu_si256, _mm256_xor_si256,
        _mm_loadu_si128, _mm_storeu_si128, _mm_xor_si128,
    };

    use super::xor_tail;

    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn xor_avx2(dst: *mut u8, a: *const u8, b: *const u8, n: usize) {
        let mut i = 0;
        while i + 32 <= n {
            let va = _mm256_loadu_si256(a.add(i) as *const __m256i);
            let vb = _mm256_loadu_si256(b.add(i) as *const __m256i);
            _mm256_storeu_si256(dst.add(i) as *mut __m256i, _mm256_xor_si256(va, vb));
            i += 32;
        }
        if i + 16 <= n {
            let va = _mm_loadu_si128(a.add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.add(i) as *const __m128i);
            _mm_storeu_si128(dst.add(i) as *mut __m128i, _mm_xor_si128(va, vb));
            i += 16;
        }
        xor_tail(dst, a, b, i, n);
    }

    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn xor_sse2(dst: *mut u8, a: *const u8, b: *const u8, n: usize) {
        let mut i = 0;
        while i + 16 <= n {
            let va = _mm_loadu_si128(a.add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.add(i) as *const __m128i);
            _mm_storeu_si128(dst.add(i) as *mut __m128i, _mm_xor_si128(va, vb));
            i += 16;
        }
        xor_tail(dst, a, b, i, n);
    }
}

#[cfg(target_arch = "aarch64")]
mod arm {
    use core::arch::aarch64::{veorq_u8, vld1q_u8, vst1q_u8};

    use super::xor_tail;

    #[target_feature(enable = "neon")]
    pub(super) unsafe fn xor_neon(dst: *mut u8, a: *const u8, b: *const u8, n: usize) {
        let mut i = 0;
        while i + 16 <= n {
            let va = vld1q_u8(a.add(i));
            let vb = vld1q_u8(b.add(i));
            vst1q_u8(dst.add(i), veorq_u8(va, vb));
            i += 16;
        }
        xor_tail(dst, a, b, i, n);
    }
}
