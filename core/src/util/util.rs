// src/util/util.rs

use crate::{ENCRYPTED_VALUE_PREFIX, RESERVED_KEY_PREFIX};

/// True for keys in the reserved `gruntr__` namespace (compared case-insensitively)
/// ```
///   use gruntr::util::is_reserved_key;
///   assert!(is_reserved_key("gruntr__sha3"));
///   assert!(is_reserved_key("GRUNTR__vault_host"));
///   assert!(!is_reserved_key("my.gruntr__key"));
/// ```
pub fn is_reserved_key(key: &str) -> bool {
    key.len() >= RESERVED_KEY_PREFIX.len()
        && key.is_char_boundary(RESERVED_KEY_PREFIX.len())
        && key[..RESERVED_KEY_PREFIX.len()].eq_ignore_ascii_case(RESERVED_KEY_PREFIX)
}

/// True if the value carries the transit ciphertext marker (`vault:`),
/// ignoring surrounding whitespace
/// ```
///   use gruntr::util::is_encrypted_value;
///   assert!(is_encrypted_value("vault:v1:abcd"));
///   assert!(is_encrypted_value("  vault:v2:abcd "));
///   assert!(!is_encrypted_value("plain vault:v1:abcd"));
/// ```
pub fn is_encrypted_value(value: &str) -> bool {
    value.trim().starts_with(ENCRYPTED_VALUE_PREFIX)
}

pub fn remove_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_prefix_needs_full_match() {
        assert!(!is_reserved_key("gruntr_"));
        assert!(!is_reserved_key(""));
        assert!(is_reserved_key("gruntr__"));
        // multibyte char straddling the prefix length must not panic
        assert!(!is_reserved_key("gruntr_é"));
    }

    #[test]
    fn trailing_slash() {
        assert_eq!(remove_trailing_slash("http://host:8200/"), "http://host:8200");
        assert_eq!(remove_trailing_slash("http://host:8200"), "http://host:8200");
    }
}
