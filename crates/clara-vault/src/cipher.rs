//! Reversible PIN transform for the vault record.
//!
//! Byte `i` of the input is XORed with byte `i mod len(pin)` of the PIN and the
//! result is base64 encoded with the standard padded alphabet. Records written
//! by the web client decode unchanged.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Prefix stored in front of the secret. A decoded payload that does not
/// start with it was decoded with the wrong PIN.
pub const MAGIC_TAG: &str = "VALID-CLARA-KEY-";

fn xor_with_pin(bytes: &[u8], pin: &[u8]) -> Vec<u8> {
    if pin.is_empty() {
        return bytes.to_vec();
    }
    bytes
        .iter()
        .zip(pin.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Encode `text` under `pin`.
#[must_use]
pub fn encode(text: &str, pin: &str) -> String {
    BASE64.encode(xor_with_pin(text.as_bytes(), pin.as_bytes()))
}

/// Decode `blob` under `pin`.
///
/// Never fails: invalid base64 yields the empty string and bytes that are
/// not valid UTF-8 after the XOR are replaced lossily. Callers detect a wrong
/// PIN by checking for [`MAGIC_TAG`].
#[must_use]
pub fn decode(blob: &str, pin: &str) -> String {
    match BASE64.decode(blob.trim()) {
        Ok(bytes) => String::from_utf8_lossy(&xor_with_pin(&bytes, pin.as_bytes())).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_matches_web_client_record() {
        assert_eq!(
            encode("VALID-CLARA-KEY-sk-test-123", "482913"),
            "Ynl+cHUed3Rza3Aef31rFEJYGUxXSkUeBQoB"
        );
        assert_eq!(encode("abc", "123456"), "UFBQ");
    }

    #[test]
    fn test_decode_known_record() {
        assert_eq!(
            decode("Ynl+cHUed3Rza3Aef31rFEJYGUxXSkUeBQoB", "482913"),
            "VALID-CLARA-KEY-sk-test-123"
        );
    }

    #[test]
    fn test_decode_with_wrong_pin_loses_tag() {
        let blob = encode("VALID-CLARA-KEY-sk-test-123", "482913");
        assert!(!decode(&blob, "000000").starts_with(MAGIC_TAG));
    }

    #[test]
    fn test_corrupt_base64_decodes_to_empty() {
        assert_eq!(decode("%%% not base64 %%%", "123456"), "");
        assert_eq!(decode("abc", "123456"), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode("", "123456"), "");
        assert_eq!(decode("", "123456"), "");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]
        #[test]
        fn prop_decode_inverts_encode(text in any::<String>(), pin in "[0-9]{6}") {
            prop_assert_eq!(decode(&encode(&text, &pin), &pin), text);
        }
    }
}
