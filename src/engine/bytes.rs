#![forbid(unsafe_code)]
// Byte-at-a-time XOR.
// - Correct for any alignment and any length, including the tails of the other paths.
// - In-place operands XOR into the destination directly.

use super::Operands;

/// XORs every byte of `ops`.
#[inline]
pub(crate) fn xor(ops: Operands<'_>) {
    match ops {
        Operands::Split { dst, a, b } => {
            for ((d, x), y) in dst.iter_mut().zip(a).zip(b) {
                *d = x ^ y;
            }
        }
        Operands::InPlace { dst, b } => {
            for (d, y) in dst.iter_mut().zip(b) {
                *d ^= y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let a = [0x0Fu8, 0xF0, 0x55];
        let b = [0xFFu8, 0x00, 0x55];
        let mut d = [0u8; 3];
        xor(Operands::Split {
            dst: &mut d,
            a: &a,
            b: &b,
        });
        assert_eq!(d, [0xF0, 0xF0, 0x00]);
    }

    #[test]
    fn test_in_place_roundtrip() {
        let data = (0..100).map(|i| i as u8).collect::<Vec<u8>>();
        let key = (0..100).map(|i| (i as u8).wrapping_mul(3)).collect::<Vec<u8>>();
        let mut buf = data.clone();
        xor(Operands::InPlace { dst: &mut buf, b: &key });
        assert_ne!(buf, data);
        xor(Operands::InPlace { dst: &mut buf, b: &key });
        assert_eq!(buf, data);
    }
}
