//! Error types shared across the backend.
//!
//! In-game mistakes (wrong tile, non-word, mismatched response) are NOT errors; they are
//! controller states. These enums cover configuration, protocol misuse, persistence and HTTP.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::assessment::AssessmentKind;
use crate::domain::GameType;

/// Content catalog failed validation. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
  #[error("catalog has no categories")]
  Empty,

  #[error("category '{category}' has no games")]
  EmptyCategory { category: String },

  #[error("game '{game}': {message}")]
  InvalidGame { game: String, message: String },

  #[error("duplicate game slug '{0}'")]
  DuplicateSlug(String),

  #[error("failed to read catalog file '{path}': {message}")]
  Io { path: String, message: String },

  #[error("failed to parse catalog TOML: {0}")]
  Parse(String),
}

impl ContentError {
  pub fn invalid(game: &str, message: impl Into<String>) -> Self {
    Self::InvalidGame { game: game.to_string(), message: message.into() }
  }
}

/// An event that doesn't fit the current game session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
  #[error("no game at category {category}, index {game}")]
  NoSuchGame { category: usize, game: usize },

  #[error("'{event}' does not apply to a {active:?} game")]
  WrongGameType { event: &'static str, active: GameType },
}

/// Persistence port failures. A failed submission is never marked as submitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
  #[error("result sink rejected submission: {0}")]
  Sink(String),

  #[error("result sink timed out after {0} ms")]
  Timeout(u64),
}

/// An assessment event that could not be applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessmentError {
  #[error("unknown prompt '{0}'")]
  UnknownPrompt(String),

  #[error("'{event}' does not apply to the {tab:?} tab")]
  WrongTab { event: &'static str, tab: AssessmentKind },

  #[error("no failed submission to retry")]
  NothingToRetry,

  #[error(transparent)]
  Submit(#[from] SubmitError),
}

impl AssessmentError {
  /// Only sink failures are worth a retry button; the rest are client bugs.
  pub fn is_retryable(&self) -> bool {
    matches!(self, AssessmentError::Submit(_))
  }
}

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("invalid student: {0}")]
  Validation(String),

  #[error("student {0} not found")]
  NotFound(u64),

  #[error("roster storage error: {0}")]
  Io(#[from] std::io::Error),

  #[error("roster serialization error: {0}")]
  Serde(#[from] serde_json::Error),
}

/// HTTP-facing error. Maps onto a status code + `{ "error": message }` body.
#[derive(Error, Debug)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Internal(String),
}

impl From<StoreError> for AppError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::Validation(m) => AppError::Validation(m),
      StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
      other => AppError::Internal(other.to_string()),
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> axum::response::Response {
    let status = match &self {
      AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
