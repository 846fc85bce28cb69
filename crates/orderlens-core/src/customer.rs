//! Customers as the API identifies and lists them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque customer identifier.
///
/// The API sends numeric ids, but nothing here depends on that: the id is only
/// ever echoed back into a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<i64> for CustomerId {
  fn from(id: i64) -> Self { Self(id.to_string()) }
}

impl From<&str> for CustomerId {
  fn from(id: &str) -> Self { Self(id.to_string()) }
}

impl<'de> Deserialize<'de> for CustomerId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Int(i64),
      Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
      Raw::Int(n) => Self::from(n),
      Raw::Text(s) => Self(s),
    })
  }
}

/// One row of `GET /top_customers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
  pub id:          CustomerId,
  pub name:        String,
  /// Lifetime order value, when the API reports it.
  #[serde(default, deserialize_with = "crate::amount::optional")]
  pub order_total: Option<f64>,
}

/// Contact details from `GET /customer/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
  pub id:              CustomerId,
  pub name:            String,
  #[serde(default)]
  pub address:         Option<String>,
  #[serde(default)]
  pub phone:           Option<String>,
  #[serde(default, deserialize_with = "crate::amount::optional")]
  pub account_balance: Option<f64>,
  #[serde(default)]
  pub comment:         Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_accept_numbers_and_strings() {
    let a: CustomerId = serde_json::from_str("42").unwrap();
    let b: CustomerId = serde_json::from_str("\"42\"").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "42");
  }

  #[test]
  fn top_customer_order_total_is_optional() {
    let rows: Vec<TopCustomer> = serde_json::from_str(
      r#"[{"id": 7, "name": "Customer#7", "order_total": "1500.25"},
          {"id": 8, "name": "Customer#8"}]"#,
    )
    .unwrap();
    assert_eq!(rows[0].order_total, Some(1500.25));
    assert_eq!(rows[1].order_total, None);
    assert_eq!(rows[1].id, CustomerId::from(8));
  }
}
