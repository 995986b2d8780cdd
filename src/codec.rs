//! Chart payload codec
//!
//!     A chart's configuration travels inside the document tree as a single attribute value,
//!     the carrier string. The carrier is built in two steps:
//!
//!         configuration value → compact JSON text → standard base64 (with padding)
//!
//!     The base64 step runs over the UTF-8 bytes of the JSON, so any unicode content
//!     round-trips. There is no compression and no randomness: the same value always encodes to
//!     the same carrier, which keeps markup diffable and snapshot tests stable.
//!
//! Carrier contract
//!
//!     The carrier alphabet is `[A-Za-z0-9+/=]`. It contains no control characters, quotes,
//!     angle brackets or ampersands, so it can be placed verbatim in an HTML attribute, an XML
//!     attribute or any plain-text attribute slot without escaping.
//!
//!     JSON object keys keep their parsed order, so a decoded-then-pretty-printed payload reads
//!     like the fence the author wrote. Floats are parsed with `float_roundtrip`, so every finite
//!     number decodes to the same bits it was encoded from.

use crate::error::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Encode a configuration value into its carrier string
pub fn encode(config: &Value) -> String {
    // Serializing a `Value` cannot fail: keys are always strings and numbers are finite.
    let json = serde_json::to_string(config).unwrap_or_default();
    STANDARD.encode(json.as_bytes())
}

/// Decode a carrier string back into the configuration value it was built from
pub fn decode(carrier: &str) -> Result<Value, DecodeError> {
    let bytes = STANDARD.decode(carrier.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// Decode a carrier and pretty-print the configuration (two-space indentation)
pub fn decode_pretty(carrier: &str) -> Result<String, DecodeError> {
    let value = decode(carrier)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_is_standard_base64_of_compact_json() {
        let carrier = encode(&json!({ "series": [] }));
        insta::assert_snapshot!(carrier, @"eyJzZXJpZXMiOltdfQ==");
    }

    #[test]
    fn test_multibyte_text_round_trips() {
        let config = json!({ "title": { "text": "销量" } });
        let carrier = encode(&config);
        assert_eq!(carrier, "eyJ0aXRsZSI6eyJ0ZXh0Ijoi6ZSA6YePIn19");
        assert_eq!(decode(&carrier).unwrap(), config);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let config = json!({ "b": 1, "a": [true, null, 2.5] });
        assert_eq!(encode(&config), encode(&config));
    }

    #[test]
    fn test_floats_round_trip_exactly() {
        let samples: [f64; 5] = [
            0.1,
            1.0000000000000002,
            5e-324,
            -2.2250738585072014e-308,
            1.7976931348623157e308,
        ];
        for f in samples {
            let decoded = decode(&encode(&json!({ "v": f }))).unwrap();
            assert_eq!(decoded["v"].as_f64().map(f64::to_bits), Some(f.to_bits()));
        }
    }

    #[test]
    fn test_key_order_is_preserved() {
        let config: Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        let pretty = decode_pretty(&encode(&config)).unwrap();
        assert_eq!(pretty, "{\n  \"z\": 1,\n  \"a\": 2\n}");
    }

    #[test]
    fn test_carrier_alphabet_is_attribute_safe() {
        let carrier = encode(&json!({ "html": "<a href=\"x\">&</a>\n\t" }));
        assert!(carrier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')));
    }

    #[test]
    fn test_truncated_carrier_fails() {
        let carrier = encode(&json!({ "series": [] }));
        let truncated = &carrier[..carrier.len() - 3];
        assert!(matches!(decode(truncated), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_non_json_payload_fails() {
        let carrier = STANDARD.encode("{ invalid json ");
        assert!(matches!(decode(&carrier), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_non_utf8_payload_fails() {
        let carrier = STANDARD.encode([0xff, 0xfe, 0x00]);
        assert!(matches!(decode(&carrier), Err(DecodeError::Utf8(_))));
    }
}
