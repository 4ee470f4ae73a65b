//! Key padding normalizer.
//!
//! Turns an arbitrary secret string into exactly `length` key bytes by
//! right-padding with `*` or truncating. This is a fixed, public,
//! unsalted transform and NOT a key-derivation function:
//!
//! - two secrets that share their first `length` bytes map to the same key;
//! - padding adds no entropy, so a short secret yields a weak key.
//!
//! It is kept bit-compatible with envelopes already in storage.

/// Filler byte appended to secrets shorter than the target length.
pub const FILLER: u8 = b'*';

/// Produce exactly `length` bytes from `secret`.
///
/// Pure and total: the same input always yields the same output, and the
/// output length is always `length`. Truncation works on bytes, so a
/// multi-byte character may be cut in half; the result is key material,
/// not text.
pub fn normalize(secret: &str, length: usize) -> Vec<u8> {
    let mut bytes = secret.as_bytes().to_vec();
    bytes.resize(length, FILLER);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_padded() {
        assert_eq!(normalize("abc", 6), b"abc***".to_vec());
    }

    #[test]
    fn long_input_is_truncated() {
        assert_eq!(normalize("correcthorsebattery", 16), b"correcthorsebatt".to_vec());
    }

    #[test]
    fn exact_length_is_unchanged() {
        assert_eq!(normalize("0123456789abcdef", 16), b"0123456789abcdef".to_vec());
    }

    #[test]
    fn output_length_always_matches() {
        let long = "x".repeat(200);
        for secret in ["", "a", "ünïcödé-päss", long.as_str()] {
            for length in [1, 16, 32, 64] {
                assert_eq!(normalize(secret, length).len(), length);
            }
        }
    }

    #[test]
    fn shared_prefix_collides() {
        // Documented weakness: only the first `length` bytes matter.
        assert_eq!(
            normalize("same-prefix-0123-tail-one", 16),
            normalize("same-prefix-0123-tail-two", 16)
        );
    }

    #[test]
    fn empty_secret_is_all_filler() {
        assert_eq!(normalize("", 4), vec![FILLER; 4]);
    }
}
