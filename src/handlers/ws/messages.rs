//! WebSocket message types
//!
//! Frame shapes for the conversation relay protocol. Inbound frames carry
//! the user's (already transcribed) text; outbound frames carry either the
//! assistant reply with its audio URL, or an error description.

use serde::{Deserialize, Serialize};

/// Inbound chat frame
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    /// User utterance text
    pub text: String,
    /// Voice identity for the synthesized reply; the configured default is
    /// used when absent
    #[serde(default)]
    pub voice_actor_id: Option<String>,
}

/// Outbound frames
///
/// Untagged on purpose: clients receive `{"text", "voice_url"}` on success
/// and `{"error"}` on failure, with no envelope around either.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Reply { text: String, voice_url: String },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_with_voice_actor() {
        let msg: IncomingMessage =
            serde_json::from_str(r#"{"text": "hello", "voice_actor_id": "7"}"#).unwrap();
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.voice_actor_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_incoming_without_voice_actor() {
        let msg: IncomingMessage = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(msg.text, "hello");
        assert!(msg.voice_actor_id.is_none());
    }

    #[test]
    fn test_incoming_missing_text_is_rejected() {
        let result = serde_json::from_str::<IncomingMessage>(r#"{"voice_actor_id": "7"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_frame_shape() {
        let frame = OutgoingMessage::Reply {
            text: "hi there".to_string(),
            voice_url: "https://x/a.mp3".to_string(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "hi there", "voice_url": "https://x/a.mp3"})
        );
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = OutgoingMessage::Error {
            error: "something failed".to_string(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json, serde_json::json!({"error": "something failed"}));
    }
}
