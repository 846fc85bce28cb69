//! Error types for `orderlens-core`.

use thiserror::Error;

/// Every failure the core can report.
///
/// `Clone` so a failure can sit inside a [`LoadState`](crate::load::LoadState)
/// that many observers borrow at once.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  /// The request could not be sent or no response arrived.
  #[error("transport error: {0}")]
  Transport(String),

  /// The server answered with a non-2xx status.
  #[error("HTTP {status}: {message}")]
  Http { status: u16, message: String },

  /// The payload was missing fields or carried malformed dates or numbers.
  #[error("decode error: {0}")]
  Decode(String),

  /// A caller handed the normalizer data that breaks its input contract.
  #[error("input contract violated: {0}")]
  InputContract(String),

  #[error("cannot apply {event} to a {from} load state")]
  InvalidTransition {
    from:  &'static str,
    event: &'static str,
  },
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self { Self::Decode(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
