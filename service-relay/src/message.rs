use serde::{Deserialize, Serialize};

const LOG_KEY_PREFIX: &str = "chat:";

/// A chat message as clients send and receive it.
///
/// `timestamp` is supplied by the client and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Key of the durable list this message is appended to.
    pub fn log_key(&self) -> String {
        format!("{LOG_KEY_PREFIX}{}", self.username)
    }

    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_key() {
        let message = ChatMessage::new("alice", "hi", "t1");
        assert_eq!(message.log_key(), "chat:alice");
    }

    #[test]
    fn test_payload_shape() {
        let message = ChatMessage::new("alice", "hi", "t1");
        let payload = message.to_payload().unwrap();

        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"{"username":"alice","text":"hi","timestamp":"t1"}"#
        );
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let raw = r#"{"username":"bob","text":"","timestamp":"t2","color":"red"}"#;
        let message = serde_json::from_str::<ChatMessage>(raw).unwrap();

        assert_eq!(message, ChatMessage::new("bob", "", "t2"));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(serde_json::from_str::<ChatMessage>(r#"{"username":"bob","text":"hi"}"#).is_err());
        assert!(serde_json::from_str::<ChatMessage>(r#"{"username":"bob","text":"hi","timestamp":3}"#).is_err());
        assert!(serde_json::from_str::<ChatMessage>("not json").is_err());
    }
}
