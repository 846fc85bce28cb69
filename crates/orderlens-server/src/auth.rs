//! Static bearer-token check.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};

use crate::{AppState, error::Error};

/// Zero-size marker: present in the handler means the request carried the
/// configured token.
pub struct Authorized;

/// Verify `Authorization: Bearer <token>` directly from headers.
pub fn verify_bearer(headers: &HeaderMap, token: &str) -> Result<(), Error> {
  let presented = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(Error::Unauthorized)?;

  // An empty configured token would let `Bearer ` through.
  if token.is_empty() || !constant_time_eq(presented.as_bytes(), token.as_bytes()) {
    return Err(Error::Unauthorized);
  }
  Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl FromRequestParts<AppState> for Authorized {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.api_token)?;
    Ok(Authorized)
  }
}
