//! Chat message orchestration
//!
//! One inbound frame drives one full exchange: append the user turn, obtain
//! the assistant reply, append it, then synthesize audio for the reply. The
//! transcript is never rolled back; a failure mid-exchange leaves whatever
//! turns were already appended in place.

use std::sync::Arc;

use tracing::error;

use super::messages::{IncomingMessage, OutgoingMessage};
use crate::core::session::{Session, Turn};
use crate::state::AppState;

/// Process one inbound chat frame against the connection's session.
///
/// Returns the frame to send back: the assistant reply with its audio URL on
/// success, or an error frame. Either way the connection stays usable.
pub async fn process_chat_message(
    msg: IncomingMessage,
    session: &Arc<Session>,
    app_state: &Arc<AppState>,
) -> OutgoingMessage {
    let voice_actor_id = msg
        .voice_actor_id
        .unwrap_or_else(|| app_state.config.default_voice_actor_id.clone());

    session.push(Turn::user(msg.text));

    let history = session.history();
    let assistant_text = match app_state.completion.complete(&history).await {
        Ok(text) => text,
        Err(e) => {
            error!("Completion failed: {}", e);
            return OutgoingMessage::Error {
                error: e.to_string(),
            };
        }
    };
    session.push(Turn::assistant(assistant_text.clone()));

    match app_state
        .synthesis
        .synthesize(&assistant_text, &voice_actor_id)
        .await
    {
        Ok(voice_url) => OutgoingMessage::Reply {
            text: assistant_text,
            voice_url,
        },
        Err(e) => {
            error!("Synthesis failed: {}", e);
            OutgoingMessage::Error {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::core::session::Role;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    // Both upstream services are mocked on the same server; the paths do not
    // collide.
    fn test_state(base_url: &str) -> Arc<AppState> {
        AppState::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            openai_api_key: "sk-test".to_string(),
            openai_base_url: base_url.to_string(),
            gpt_model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            voice_api_token: "voice-test".to_string(),
            voice_api_base_url: base_url.to_string(),
            default_voice_actor_id: "1".to_string(),
            voice_speed: "1".to_string(),
            voice_format: "mp3".to_string(),
            max_retries: 2,
            retry_delay: Duration::from_millis(10),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn mount_completion(server: &MockServer, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": reply}}]
            })))
            .mount(server)
            .await;
    }

    async fn mount_synthesis(server: &MockServer, voice_actor_id: &str, url: &str) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/voice-actors/{voice_actor_id}/generate-voice"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generatedVoice": {"url": url}
            })))
            .mount(server)
            .await;
    }

    fn incoming(text: &str, voice_actor_id: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            text: text.to_string(),
            voice_actor_id: voice_actor_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_two_turns() {
        let server = MockServer::start().await;
        mount_completion(&server, "hi there").await;
        mount_synthesis(&server, "1", "https://x/a.mp3").await;

        let state = test_state(&server.uri());
        let session = Arc::new(Session::default());

        let reply = process_chat_message(incoming("hello", None), &session, &state).await;

        match reply {
            OutgoingMessage::Reply { text, voice_url } => {
                assert_eq!(text, "hi there");
                assert_eq!(voice_url, "https://x/a.mp3");
            }
            other => panic!("Expected reply frame, got {other:?}"),
        }

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test]
    async fn test_explicit_voice_actor_overrides_default() {
        let server = MockServer::start().await;
        mount_completion(&server, "ok").await;
        mount_synthesis(&server, "99", "https://x/v99.mp3").await;

        let state = test_state(&server.uri());
        let session = Arc::new(Session::default());

        let reply = process_chat_message(incoming("hello", Some("99")), &session, &state).await;

        match reply {
            OutgoingMessage::Reply { voice_url, .. } => {
                assert_eq!(voice_url, "https://x/v99.mp3");
            }
            other => panic!("Expected reply frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_unanswered_user_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model down"))
            .mount(&server)
            .await;

        let state = test_state(&server.uri());
        let session = Arc::new(Session::default());

        let reply = process_chat_message(incoming("hello", None), &session, &state).await;

        assert!(matches!(reply, OutgoingMessage::Error { .. }));
        let history = session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_synthesis_failure_keeps_assistant_turn() {
        let server = MockServer::start().await;
        mount_completion(&server, "hi there").await;
        Mock::given(method("POST"))
            .and(path("/voice-actors/1/generate-voice"))
            .respond_with(ResponseTemplate::new(500).set_body_string("voice down"))
            .expect(2)
            .mount(&server)
            .await;

        let state = test_state(&server.uri());
        let session = Arc::new(Session::default());

        let reply = process_chat_message(incoming("hello", None), &session, &state).await;

        match reply {
            OutgoingMessage::Error { error } => {
                assert!(error.contains("500"));
            }
            other => panic!("Expected error frame, got {other:?}"),
        }

        // The completion already succeeded; its turn is not rolled back
        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test]
    async fn test_full_history_submitted_on_followup() {
        let server = MockServer::start().await;
        mount_completion(&server, "reply").await;
        mount_synthesis(&server, "1", "https://x/a.mp3").await;

        let state = test_state(&server.uri());
        let session = Arc::new(Session::default());

        process_chat_message(incoming("first", None), &session, &state).await;
        process_chat_message(incoming("second", None), &session, &state).await;

        let requests = server.received_requests().await.unwrap();
        let completion_bodies: Vec<serde_json::Value> = requests
            .iter()
            .filter(|r| r.url.path() == "/chat/completions")
            .map(|r| r.body_json().unwrap())
            .collect();
        assert_eq!(completion_bodies.len(), 2);

        // Second call sees system + user + assistant + user
        let messages = completion_bodies[1]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "first");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "second");
    }
}
