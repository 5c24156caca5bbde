//! Registry key codec.
//!
//! Source names are human-readable and may contain spaces, slashes, or any
//! other UTF-8. Registry keys must be URL-safe so they can travel through
//! wire identifiers unescaped. The codec percent-encodes everything outside
//! the RFC 3986 unreserved set, which makes the mapping deterministic and
//! reversible.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use stratafs_common::{Error, RegistryKey, Result};

/// Everything outside `ALPHA / DIGIT / "-" / "." / "_" / "~"` is escaped.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a source name into its registry key.
///
/// Deterministic: the same name always yields the same key.
///
/// # Errors
/// - Empty name
pub fn encode(name: &str) -> Result<RegistryKey> {
    RegistryKey::new(utf8_percent_encode(name, KEY_ENCODE_SET).to_string())
}

/// Decode a registry key back into the source name it was derived from.
///
/// `decode(encode(name)) == name` for every valid name.
///
/// # Errors
/// - Decoded bytes are not valid UTF-8
pub fn decode(key: &RegistryKey) -> Result<String> {
    percent_decode_str(key.as_str())
        .decode_utf8()
        .map(|name| name.into_owned())
        .map_err(|e| Error::Decode(format!("Key '{}' is not valid UTF-8: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_plain_name() {
        let key = encode("mysource").unwrap();
        assert_eq!(key.as_str(), "mysource");
    }

    #[test]
    fn test_encode_escapes_reserved() {
        assert_eq!(encode("my source").unwrap().as_str(), "my%20source");
        assert_eq!(encode("a/b").unwrap().as_str(), "a%2Fb");
        assert_eq!(encode("data:2024").unwrap().as_str(), "data%3A2024");
    }

    #[test]
    fn test_encode_keeps_unreserved() {
        assert_eq!(encode("a-b.c_d~e").unwrap().as_str(), "a-b.c_d~e");
    }

    #[test]
    fn test_encode_unicode() {
        assert_eq!(encode("données").unwrap().as_str(), "donn%C3%A9es");
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(encode("").is_err());
    }

    #[test]
    fn test_decode_round_trip() {
        let name = "shared drive/2024";
        let key = encode(name).unwrap();
        assert_eq!(decode(&key).unwrap(), name);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let key = RegistryKey::new("%FF%FE").unwrap();
        assert!(matches!(decode(&key), Err(Error::Decode(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(name in ".+") {
            let key = encode(&name).unwrap();
            prop_assert_eq!(decode(&key).unwrap(), name);
        }

        #[test]
        fn prop_keys_are_url_safe(name in ".+") {
            let key = encode(&name).unwrap();
            prop_assert!(key
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'%')));
        }
    }
}
