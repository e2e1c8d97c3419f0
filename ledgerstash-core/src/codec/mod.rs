//! Payload codec: base64 datastring encoding with optional secret sealing.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::secretbox;
use crate::error::{Result, StashError};

/// What a stored payload should be decoded back into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Bytes,
    Text,
}

/// A payload handed to `save` or returned from `load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
}

impl Payload {
    pub fn kind(&self) -> DataKind {
        match self {
            Payload::Bytes(_) => DataKind::Bytes,
            Payload::Text(_) => DataKind::Text,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Text(text) => text.into_bytes(),
        }
    }
}

/// Encode a payload into a single datastring: base64, then sealed with the
/// secret when one is given.
pub fn encode(payload: &Payload, secret: Option<&str>) -> Result<String> {
    let base64 = STANDARD.encode(payload.as_bytes());
    match secret {
        Some(secret) => Ok(secretbox::seal(&base64, secret)?),
        None => Ok(base64),
    }
}

/// Decode a datastring back into a payload.
///
/// A wrong or missing secret fails with `IncorrectPassword`; it never silently
/// returns corrupted data. A datastring that is not valid base64, or bytes that
/// are not valid UTF-8 when `DataKind::Text` was requested, fail with
/// `IncorrectDatatype`.
pub fn decode(datastring: &str, kind: DataKind, secret: Option<&str>) -> Result<Payload> {
    let base64 = match secret {
        Some(secret) => {
            secretbox::open(datastring, secret).map_err(|_| StashError::IncorrectPassword)?
        }
        None => datastring.to_string(),
    };

    let bytes = STANDARD
        .decode(base64.as_bytes())
        .map_err(|e| StashError::IncorrectDatatype(format!("payload is not valid base64: {e}")))?;

    match kind {
        DataKind::Bytes => Ok(Payload::Bytes(bytes)),
        DataKind::Text => {
            let text = String::from_utf8(bytes).map_err(|_| {
                StashError::IncorrectDatatype("payload is not valid UTF-8 text".to_string())
            })?;
            Ok(Payload::Text(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_bytes_roundtrip() {
        let payload = Payload::Bytes(vec![0x00, 0xFF, 0x10, 0x20, 0x7F]);
        let datastring = encode(&payload, None).unwrap();
        let decoded = decode(&datastring, DataKind::Bytes, None).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_encode_decode_text_roundtrip() {
        let payload = Payload::Text("HELLO_WORLD".to_string());
        let datastring = encode(&payload, None).unwrap();
        let decoded = decode(&datastring, DataKind::Text, None).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_roundtrip_with_secret() {
        let payload = Payload::Text("confidential".to_string());
        let datastring = encode(&payload, Some("s3cret")).unwrap();
        let decoded = decode(&datastring, DataKind::Text, Some("s3cret")).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_wrong_secret_is_incorrect_password() {
        let payload = Payload::Text("confidential".to_string());
        let datastring = encode(&payload, Some("right")).unwrap();
        let err = decode(&datastring, DataKind::Text, Some("wrong")).unwrap_err();
        assert!(matches!(err, StashError::IncorrectPassword));
    }

    #[test]
    fn test_missing_secret_never_recovers_payload() {
        let payload = Payload::Bytes(vec![1, 2, 3]);
        let datastring = encode(&payload, Some("secret")).unwrap();
        // Without the secret, decoding can only see the opaque envelope.
        match decode(&datastring, DataKind::Bytes, None) {
            Ok(decoded) => assert_ne!(decoded, payload),
            Err(_) => {}
        }
    }

    #[test]
    fn test_invalid_base64_is_incorrect_datatype() {
        let err = decode("!!! not base64 !!!", DataKind::Bytes, None).unwrap_err();
        assert!(matches!(err, StashError::IncorrectDatatype(_)));
    }

    #[test]
    fn test_non_utf8_text_is_incorrect_datatype() {
        let datastring = encode(&Payload::Bytes(vec![0xFF, 0xFE]), None).unwrap();
        let err = decode(&datastring, DataKind::Text, None).unwrap_err();
        assert!(matches!(err, StashError::IncorrectDatatype(_)));
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::Bytes(Vec::new());
        let datastring = encode(&payload, None).unwrap();
        assert!(datastring.is_empty());
        let decoded = decode(&datastring, DataKind::Bytes, None).unwrap();
        assert_eq!(decoded, payload);
    }
}
