//! SHA-256 checksum utility for change-script fingerprints.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a script's text
pub fn compute_checksum(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// First `len` hex characters of a checksum, for table output.
pub fn short_checksum(checksum: &str, len: usize) -> &str {
    checksum.get(..len).unwrap_or(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_hex() {
        let a = compute_checksum("CREATE TABLE a (id INT)");
        let b = compute_checksum("CREATE TABLE a (id INT)");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_changes_with_content() {
        assert_ne!(compute_checksum("a"), compute_checksum("b"));
    }

    #[test]
    fn test_short_checksum_truncates() {
        assert_eq!(short_checksum("abcdef", 4), "abcd");
        assert_eq!(short_checksum("ab", 8), "ab");
    }
}
