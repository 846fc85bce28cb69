//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("{0}")]
  NotFound(String),
  #[error("dataset error: {0}")]
  Dataset(String),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self { Self::Dataset(e.to_string()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Dataset(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let mut res = (status, Json(json!({ "detail": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
