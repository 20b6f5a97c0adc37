//! C ABI.
//!
//! Exposes the engine to C cipher layers linking the `staticlib`. The header is generated
//! by `build.rs` into `include/bulkxor.h`.
//!
//! Exact aliasing (`dst == a` or `dst == b`) is detected by pointer equality and routed to
//! the in-place path, so no `&mut` ever coexists with a `&` over the same bytes. Partial
//! overlap at a different offset is undefined behavior.

use core::slice;

use crate::engine::{XorEngine, XorError};

/// Destination too small.
pub const BULKXOR_ERR_CAPACITY: i32 = -1;
/// `a` and `b` differ in length (`bulkxor_xor_words` only).
pub const BULKXOR_ERR_LENGTH: i32 = -2;
/// Null pointer with a non-zero length.
pub const BULKXOR_ERR_NULL: i32 = -3;

fn error_code(err: XorError) -> i32 {
    match err {
        XorError::InsufficientCapacity { .. } => BULKXOR_ERR_CAPACITY,
        XorError::LengthMismatch { .. } => BULKXOR_ERR_LENGTH,
    }
}

/// Which source, if any, the destination aliases.
enum Alias {
    None,
    A,
    B,
    Both,
}

fn alias_of(dst: *mut u8, a: *const u8, b: *const u8) -> Alias {
    let dst = dst as *const u8;
    match (dst == a, dst == b) {
        (false, false) => Alias::None,
        (true, false) => Alias::A,
        (false, true) => Alias::B,
        (true, true) => Alias::Both,
    }
}

/// Writes `dst[..n] = a[..n] ^ b[..n]` once `n` has been checked against every length.
///
/// # Safety
/// `dst`, `a`, `b` are non-null and valid for `n` bytes; `dst` is disjoint from or equal
/// to each source.
unsafe fn xor_checked(engine: &XorEngine, dst: *mut u8, a: *const u8, b: *const u8, n: usize) {
    if n == 0 {
        return;
    }
    match alias_of(dst, a, b) {
        Alias::None => {
            let out = slice::from_raw_parts_mut(dst, n);
            let a = slice::from_raw_parts(a, n);
            let b = slice::from_raw_parts(b, n);
            let _ = engine.xor_bytes(out, a, b);
        }
        Alias::A => {
            let b = slice::from_raw_parts(b, n);
            let _ = engine.xor_in_place(slice::from_raw_parts_mut(dst, n), b);
        }
        Alias::B => {
            let a = slice::from_raw_parts(a, n);
            let _ = engine.xor_in_place(slice::from_raw_parts_mut(dst, n), a);
        }
        // x ^ x
        Alias::Both => slice::from_raw_parts_mut(dst, n).fill(0),
    }
}

fn null_with_len(ptr: *const u8, len: usize) -> bool {
    ptr.is_null() && len > 0
}

/// Bounded XOR. Returns the number of bytes written (`min(a_len, b_len)`) or a negative
/// `BULKXOR_ERR_*` code.
///
/// # Safety
/// Each non-null pointer must be valid for its length. `dst` must not partially overlap
/// `a` or `b`.
#[no_mangle]
pub unsafe extern "C" fn bulkxor_xor_bytes(
    dst: *mut u8,
    dst_len: usize,
    a: *const u8,
    a_len: usize,
    b: *const u8,
    b_len: usize,
) -> isize {
    let n = a_len.min(b_len);
    if null_with_len(a, a_len) || null_with_len(b, b_len) || null_with_len(dst, dst_len) {
        return BULKXOR_ERR_NULL as isize;
    }
    if dst_len < n {
        log::warn!("bulkxor_xor_bytes: destination holds {} bytes, {} required", dst_len, n);
        return BULKXOR_ERR_CAPACITY as isize;
    }
    xor_checked(&XorEngine::new(), dst, a, b, n);
    n as isize
}

/// Equal-length XOR. Returns `0` or a negative `BULKXOR_ERR_*` code.
///
/// # Safety
/// As for [`bulkxor_xor_bytes`].
#[no_mangle]
pub unsafe extern "C" fn bulkxor_xor_words(
    dst: *mut u8,
    dst_len: usize,
    a: *const u8,
    a_len: usize,
    b: *const u8,
    b_len: usize,
) -> i32 {
    if null_with_len(a, a_len) || null_with_len(b, b_len) || null_with_len(dst, dst_len) {
        return BULKXOR_ERR_NULL;
    }
    if a_len != b_len {
        return error_code(XorError::LengthMismatch { a: a_len, b: b_len });
    }
    if dst_len < b_len {
        return error_code(XorError::InsufficientCapacity {
            needed: b_len,
            available: dst_len,
        });
    }
    xor_checked(&XorEngine::new(), dst, a, b, b_len);
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ptr;

    #[test]
    fn test_xor_bytes_separate() {
        let a = [0x0Fu8, 0xF0, 0x33];
        let b = [0xFFu8, 0x00];
        let mut d = [0x11u8; 3];
        let n = unsafe { bulkxor_xor_bytes(d.as_mut_ptr(), d.len(), a.as_ptr(), a.len(), b.as_ptr(), b.len()) };
        assert_eq!(n, 2);
        assert_eq!(d, [0xF0, 0xF0, 0x11]);
    }

    #[test]
    fn test_xor_bytes_capacity_and_null() {
        let a = [1u8; 8];
        let mut d = [0u8; 4];
        let rc = unsafe { bulkxor_xor_bytes(d.as_mut_ptr(), d.len(), a.as_ptr(), 8, a.as_ptr(), 8) };
        assert_eq!(rc, BULKXOR_ERR_CAPACITY as isize);
        assert_eq!(d, [0u8; 4]);

        let rc = unsafe { bulkxor_xor_bytes(d.as_mut_ptr(), 4, ptr::null(), 4, a.as_ptr(), 4) };
        assert_eq!(rc, BULKXOR_ERR_NULL as isize);

        // empty operands may be null
        let rc = unsafe { bulkxor_xor_bytes(ptr::null_mut(), 0, ptr::null(), 0, a.as_ptr(), 8) };
        assert_eq!(rc, 0);
    }

    #[test]
    fn test_aliasing_routes() {
        let key = [0x5Au8; 19];
        let data: Vec<u8> = (0..19u8).collect();
        let expected: Vec<u8> = data.iter().map(|x| x ^ 0x5A).collect();

        let mut buf = data.clone();
        let p = buf.as_mut_ptr();
        let n = unsafe { bulkxor_xor_bytes(p, 19, p, 19, key.as_ptr(), 19) };
        assert_eq!(n, 19);
        assert_eq!(buf, expected);

        let mut buf = data.clone();
        let p = buf.as_mut_ptr();
        let rc = unsafe { bulkxor_xor_words(p, 19, key.as_ptr(), 19, p, 19) };
        assert_eq!(rc, 0);
        assert_eq!(buf, expected);

        let mut buf = data.clone();
        let p = buf.as_mut_ptr();
        let rc = unsafe { bulkxor_xor_words(p, 19, p, 19, p, 19) };
        assert_eq!(rc, 0);
        assert_eq!(buf, vec![0u8; 19]);
    }

    #[test]
    fn test_xor_words_errors() {
        let a = [0u8; 8];
        let mut d = [0u8; 8];
        let rc = unsafe { bulkxor_xor_words(d.as_mut_ptr(), 8, a.as_ptr(), 8, a.as_ptr(), 7) };
        assert_eq!(rc, BULKXOR_ERR_LENGTH);
        let rc = unsafe { bulkxor_xor_words(d.as_mut_ptr(), 7, a.as_ptr(), 8, a.as_ptr(), 8) };
        assert_eq!(rc, BULKXOR_ERR_CAPACITY);
    }
}
