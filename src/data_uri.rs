//! `data:` URIs, the string form images take inside a binder.

use crate::error::BinderError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("{SCHEME}{mime}{BASE64_MARKER},{}", STANDARD.encode(bytes))
}

/// Splits a base64 data URI into its MIME type and decoded payload.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), BinderError> {
    let rest = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| BinderError::DataUri("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BinderError::DataUri("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(BASE64_MARKER)
        .ok_or_else(|| BinderError::DataUri("only base64 payloads are supported".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| BinderError::DataUri(err.to_string()))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_decode_recovers_payload() {
        let (mime, bytes) = decode("data:image/gif;base64,R0lGODlh").unwrap();
        assert_eq!(mime, "image/gif");
        assert_eq!(bytes, b"GIF89a");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("image/png;base64,YWJj").is_err());
        assert!(decode("data:image/png;base64").is_err());
        assert!(decode("data:text/plain,hello").is_err());
        assert!(decode("data:image/png;base64,@@@").is_err());
    }
}
