//! Order summaries: the wire payload and the validated domain value.
//!
//! [`OrderSummaryPayload`] mirrors the JSON exactly. [`OrderSummary`] is what
//! the rest of the system sees; the only way to get one from the wire is
//! through `TryFrom<OrderSummaryPayload>`, which parses dates and amounts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, amount::RawAmount};

// ─── Domain ──────────────────────────────────────────────────────────────────

/// The sparse monthly series exactly as the API reports it.
///
/// `totals[i]` belongs to `ticks[i]`. Months without orders are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderHistoryRaw {
  pub ticks:  Vec<String>,
  pub totals: Vec<f64>,
}

/// One customer's order summary. Built once per successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
  pub customer_name:      String,
  pub first_order_date:   NaiveDate,
  pub last_order_date:    NaiveDate,
  pub total_orders_value: f64,
  pub history:            OrderHistoryRaw,
}

impl OrderSummary {
  /// Decode and map a raw response body.
  pub fn from_json(body: &[u8]) -> Result<Self> {
    let payload: OrderSummaryPayload = serde_json::from_slice(body)?;
    payload.try_into()
  }
}

// ─── Wire ────────────────────────────────────────────────────────────────────

/// `GET /customer/{id}/order_summary` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummaryPayload {
  pub name:               String,
  pub first_order_date:   String,
  pub last_order_date:    String,
  pub total_orders_value: RawAmount,
  #[serde(default)]
  pub order_history:      OrderHistoryPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderHistoryPayload {
  #[serde(default)]
  pub ticks:  Vec<String>,
  #[serde(default)]
  pub totals: Vec<RawAmount>,
}

impl TryFrom<OrderSummaryPayload> for OrderSummary {
  type Error = Error;

  fn try_from(payload: OrderSummaryPayload) -> Result<Self> {
    let first_order_date = parse_date("first_order_date", &payload.first_order_date)?;
    let last_order_date = parse_date("last_order_date", &payload.last_order_date)?;
    if last_order_date < first_order_date {
      return Err(Error::Decode(format!(
        "last_order_date {last_order_date} precedes first_order_date {first_order_date}"
      )));
    }

    let total_orders_value = payload.total_orders_value.decode("total_orders_value")?;
    if total_orders_value < 0.0 {
      return Err(Error::Decode(format!(
        "total_orders_value {total_orders_value} is negative"
      )));
    }

    let OrderHistoryPayload { ticks, totals } = payload.order_history;
    if ticks.len() != totals.len() {
      return Err(Error::Decode(format!(
        "order_history has {} ticks but {} totals",
        ticks.len(),
        totals.len()
      )));
    }
    let totals = totals
      .iter()
      .enumerate()
      .map(|(i, raw)| raw.decode(&format!("order_history.totals[{i}]")))
      .collect::<Result<Vec<_>>>()?;

    Ok(Self {
      customer_name: payload.name,
      first_order_date,
      last_order_date,
      total_orders_value,
      history: OrderHistoryRaw { ticks, totals },
    })
  }
}

/// Accepts a bare ISO date, or a timestamp whose date part is used.
fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date);
  }
  if let Ok(dt) = raw.parse::<NaiveDateTime>() {
    return Ok(dt.date());
  }
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.date_naive())
    .map_err(|_| Error::Decode(format!("{field}: {raw:?} is not an ISO date")))
}
