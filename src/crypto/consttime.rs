use std::hint::black_box;

/// Length of a NUL-terminated string; the whole slice if no NUL is present.
fn c_len(s: &[u8]) -> usize {
    s.iter().position(|&b| b == 0).unwrap_or(s.len())
}

/// Compares two NUL-terminated strings without an early exit on mismatch.
///
/// Returns the OR of all byte XORs (zero means equal, `None` means the
/// lengths differ) and the number of byte positions visited.
///
/// Length is allowed to leak: bcrypt hashes have a fixed public length.
pub fn ct_diff(a: &[u8], b: &[u8]) -> (Option<u8>, usize) {
    let len = c_len(a);
    if len != c_len(b) {
        return (None, 0);
    }

    let mut acc = 0u8;
    let mut steps = 0usize;
    for i in 0..len {
        acc |= black_box(a[i] ^ b[i]);
        steps += 1;
    }

    (Some(acc), steps)
}

/// `true` iff `a` and `b` hold the same NUL-terminated string.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    matches!(ct_diff(a, b), (Some(0), _))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings() {
        assert!(ct_eq(b"abc\0", b"abc\0"));
        assert!(ct_eq(b"abc", b"abc\0junk"));
        assert!(ct_eq(b"", b"\0"));
    }

    #[test]
    fn different_strings() {
        assert!(!ct_eq(b"abc", b"abd"));
        assert!(!ct_eq(b"abc", b"xbc"));
    }

    #[test]
    fn length_mismatch_is_not_equal() {
        assert!(!ct_eq(b"abc", b"abcd"));
        assert_eq!(ct_diff(b"abc", b"ab"), (None, 0));
    }

    #[test]
    fn step_count_ignores_mismatch_position() {
        let (late, late_steps) = ct_diff(b"abc", b"abd");
        let (early, early_steps) = ct_diff(b"abc", b"xbc");
        let (same, same_steps) = ct_diff(b"abc", b"abc");

        assert_ne!(late, Some(0));
        assert_ne!(early, Some(0));
        assert_eq!(same, Some(0));
        assert_eq!(late_steps, 3);
        assert_eq!(early_steps, late_steps);
        assert_eq!(same_steps, late_steps);
    }

    #[test]
    fn accumulates_every_difference() {
        assert_eq!(ct_diff(&[1, 2], &[1, 3]).0, Some(0x01));
        assert_eq!(ct_diff(&[1, 2], &[3, 6]).0, Some(0x02 | 0x04));
    }

    #[test]
    fn embedded_nul_shortens_the_string() {
        assert_eq!(ct_diff(&[1, 2], &[1, 0]), (None, 0));
        assert!(!ct_eq(&[1, 2], &[1, 0, 2]));
    }
}
