//! Word-at-a-time XOR.
//!
//! Processes `len / WORD_SIZE` native words, then hands the remaining bytes to the byte
//! path. When all operands are aligned for `usize` they are viewed as `&[usize]` through
//! [`as_words`] / [`as_words_mut`], the only `unsafe` in this module. Otherwise each word
//! is assembled with a native-endian load from its byte chunk, which the compiler lowers
//! to a single unaligned load on tolerant targets and to byte loads elsewhere.

use core::mem::align_of;

use super::{bytes, Operands, WORD_SIZE};

/// XORs every byte of `ops`, a word at a time where possible.
pub(crate) fn xor(ops: Operands<'_>) {
    let len = ops.len();
    let head = len - len % WORD_SIZE;

    match ops {
        Operands::Split { dst, a, b } => {
            let (dst_head, dst_tail) = dst.split_at_mut(head);
            xor_words_split(dst_head, &a[..head], &b[..head]);
            bytes::xor(Operands::Split {
                dst: dst_tail,
                a: &a[head..],
                b: &b[head..],
            });
        }
        Operands::InPlace { dst, b } => {
            let (dst_head, dst_tail) = dst.split_at_mut(head);
            xor_words_in_place(dst_head, &b[..head]);
            bytes::xor(Operands::InPlace {
                dst: dst_tail,
                b: &b[head..],
            });
        }
    }
}

/// `dst = a ^ b` over whole words. All lengths are equal multiples of `WORD_SIZE`.
fn xor_words_split(dst: &mut [u8], a: &[u8], b: &[u8]) {
    if let (Some(aw), Some(bw)) = (as_words(a), as_words(b)) {
        if let Some(dw) = as_words_mut(dst) {
            for ((d, x), y) in dw.iter_mut().zip(aw).zip(bw) {
                *d = x ^ y;
            }
            return;
        }
    }

    for ((d, x), y) in dst
        .chunks_exact_mut(WORD_SIZE)
        .zip(a.chunks_exact(WORD_SIZE))
        .zip(b.chunks_exact(WORD_SIZE))
    {
        let w = load(x) ^ load(y);
        d.copy_from_slice(&w.to_ne_bytes());
    }
}

/// `dst ^= b` over whole words.
fn xor_words_in_place(dst: &mut [u8], b: &[u8]) {
    if let Some(bw) = as_words(b) {
        if let Some(dw) = as_words_mut(dst) {
            for (d, y) in dw.iter_mut().zip(bw) {
                *d ^= y;
            }
            return;
        }
    }

    for (d, y) in dst.chunks_exact_mut(WORD_SIZE).zip(b.chunks_exact(WORD_SIZE)) {
        let w = load(d) ^ load(y);
        d.copy_from_slice(&w.to_ne_bytes());
    }
}

#[inline(always)]
fn load(chunk: &[u8]) -> usize {
    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(chunk);
    usize::from_ne_bytes(word)
}

/// Views `bytes` as native words, or `None` if its start is not aligned for `usize`.
///
/// The view covers `bytes.len() / WORD_SIZE` words; trailing bytes are not included.
pub(crate) fn as_words(bytes: &[u8]) -> Option<&[usize]> {
    let ptr = bytes.as_ptr();
    if ptr as usize % align_of::<usize>() != 0 {
        return None;
    }
    let words = bytes.len() / WORD_SIZE;
    // SAFETY: `ptr` is aligned for `usize` (checked above) and `words * WORD_SIZE` never
    // exceeds `bytes.len()`, so the view stays inside the borrowed region. Every bit pattern
    // is a valid `usize`, and the view borrows `bytes` for its whole lifetime.
    Some(unsafe { core::slice::from_raw_parts(ptr.cast::<usize>(), words) })
}

/// Mutable counterpart of [`as_words`].
pub(crate) fn as_words_mut(bytes: &mut [u8]) -> Option<&mut [usize]> {
    let ptr = bytes.as_mut_ptr();
    if ptr as usize % align_of::<usize>() != 0 {
        return None;
    }
    let words = bytes.len() / WORD_SIZE;
    // SAFETY: as in `as_words`; the exclusive borrow of `bytes` is transferred to the view.
    Some(unsafe { core::slice::from_raw_parts_mut(ptr.cast::<usize>(), words) })
}
