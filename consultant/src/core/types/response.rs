//! Handler result type.

/// Outcome of [`super::Handler::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Message was not for this handler (e.g. empty text); nothing was sent.
    Ignore,
    /// Reply text that was sent back to the chat.
    Reply(String),
}
