//! Core conversation relay logic
//!
//! This module holds the pieces with actual control flow: session transcript
//! tracking and the clients for the completion and voice synthesis services.

pub mod completion;
pub mod session;
pub mod synthesis;

pub use completion::{CompletionClient, CompletionError};
pub use session::{ConnectionId, RegistryError, Role, Session, SessionRegistry, Turn};
pub use synthesis::{SynthesisClient, SynthesisError};

/// Cap applied to upstream response bodies quoted in error messages and logs.
const MAX_QUOTED_BODY_LEN: usize = 500;

/// Truncate an upstream body for inclusion in an error message or log line.
pub(crate) fn cap_error_body(body: &str) -> String {
    if body.len() <= MAX_QUOTED_BODY_LEN {
        return body.to_string();
    }
    // Back off to a char boundary so multi-byte text cannot split a codepoint
    let mut end = MAX_QUOTED_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
