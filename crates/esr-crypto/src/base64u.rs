//! The text carrier's binary-to-text layer: unpadded, URL-safe base64
//! ("base64u" in the protocol's own terminology).

use esr_core::error::{EsrError, Result};

pub fn encode(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

/// Decodes URL-safe unpadded base64, also accepting the standard
/// alphabet's `+`/`/` in place of `-`/`_` (§4.1: "Decoder additionally
/// accepts `+` and `/` as equivalents of `-` and `_`").
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let normalized = if s.contains('+') || s.contains('/') {
        s.replace('+', "-").replace('/', "_")
    } else {
        s.to_string()
    };
    base64::decode_config(&normalized, base64::URL_SAFE_NO_PAD)
        .map_err(|e| EsrError::DecodeError(format!("invalid base64u: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = b"\x00\x01\x02\xff\xfe hello world";
        let encoded = encode(data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(decode(&encoded).unwrap(), data.to_vec());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("not valid base64u!!!").is_err());
    }

    #[test]
    fn tolerates_standard_alphabet_on_decode() {
        // A byte string whose standard-base64 encoding contains both `+`
        // and `/`, so the url-safe and standard renderings actually
        // differ, then decode the standard form through `decode`.
        let data = [0xfb, 0xff, 0xbf];
        let url_safe = encode(&data);
        let standard = url_safe.replace('-', "+").replace('_', "/");
        assert_ne!(url_safe, standard);
        assert_eq!(decode(&standard).unwrap(), data.to_vec());
    }
}
