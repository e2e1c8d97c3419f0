//! Payload chunking: splitting, the chunk bundle, and sweep progress tracking.

pub mod splitter;
pub mod bundle;

use serde::{Deserialize, Serialize};

/// Wire shape of a content chunk record: `{"CC": "<chunk content>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMessage {
    #[serde(rename = "CC")]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_message_wire_shape() {
        let message = ChunkMessage {
            content: "HELLO".to_string(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"CC":"HELLO"}"#);

        let parsed: ChunkMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
