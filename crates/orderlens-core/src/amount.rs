//! Monetary amounts as they arrive on the wire.
//!
//! The upstream API emits totals either as JSON numbers or as decimal strings
//! (`"1234.50"`), depending on the column type behind them. Both decode to
//! `f64`; anything else is a decode error.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
  Number(f64),
  Text(String),
}

impl RawAmount {
  /// Decode to a finite number. `field` names the value in error messages.
  pub fn decode(&self, field: &str) -> Result<f64> {
    let value = match self {
      RawAmount::Number(n) => *n,
      RawAmount::Text(s) => s.trim().parse::<f64>().map_err(|_| {
        Error::Decode(format!("{field}: {s:?} is not a number"))
      })?,
    };
    if !value.is_finite() {
      return Err(Error::Decode(format!("{field}: {value} is not finite")));
    }
    Ok(value)
  }
}

impl From<f64> for RawAmount {
  fn from(n: f64) -> Self { Self::Number(n) }
}

/// `deserialize_with` helper for an optional amount field.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<RawAmount>::deserialize(deserializer)?
    .map(|raw| raw.decode("amount"))
    .transpose()
    .map_err(serde::de::Error::custom)
}
