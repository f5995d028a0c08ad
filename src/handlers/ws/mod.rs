//! # WebSocket Conversation Relay Module
//!
//! This module provides the WebSocket interface for relaying user text to the
//! completion service and returning the assistant's reply together with a
//! synthesized audio URL.
//!
//! ## WebSocket API
//!
//! ### Connection Flow
//! 1. Client connects to the `/ws` endpoint; a session with an empty
//!    transcript is registered for the connection
//! 2. Client sends a chat frame; the server appends the user turn, obtains
//!    the assistant reply, appends it, and synthesizes audio for it
//! 3. Server replies with the assistant text and the audio URL (fetchable
//!    through `/proxy/audio`)
//! 4. On disconnect the session and its transcript are discarded
//!
//! One inbound frame is processed fully before the next is read; there is no
//! pipelining within a connection.
//!
//! ### Message Types
//!
//! **Incoming frames:**
//! - `{"text": "hello", "voice_actor_id": "1"}` - User utterance
//!   (`voice_actor_id` is optional and falls back to the configured default)
//!
//! **Outgoing frames:**
//! - `{"text": "hi there", "voice_url": "https://..."}` - Assistant reply
//! - `{"error": "error description"}` - Processing failed; the connection
//!   stays open and the next frame is handled normally

mod handler;
mod messages;
mod processor;

pub use handler::ws_chat_handler;
pub use messages::{IncomingMessage, OutgoingMessage};
pub use processor::process_chat_message;
