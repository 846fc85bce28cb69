//! The in-memory dataset behind the API.
//!
//! Loaded once from a JSON fixture at startup and never mutated. Aggregates
//! (top customers, monthly history) are computed per request.

use std::{collections::BTreeMap, path::Path};

use chrono::NaiveDate;
use orderlens_core::{
  amount::RawAmount,
  period::Period,
  summary::{OrderHistoryPayload, OrderSummaryPayload},
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How many customers `GET /top_customers` returns.
pub const TOP_CUSTOMERS: usize = 10;

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub date:  NaiveDate,
  pub total: f64,
}

/// A customer and their orders. Serialises as the `GET /customer/{id}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
  pub id:              i64,
  pub name:            String,
  #[serde(default)]
  pub address:         Option<String>,
  #[serde(default)]
  pub phone:           Option<String>,
  #[serde(default)]
  pub account_balance: Option<f64>,
  #[serde(default)]
  pub comment:         Option<String>,
  #[serde(default, skip_serializing)]
  pub orders:          Vec<Order>,
}

impl CustomerRecord {
  fn order_total(&self) -> f64 { self.orders.iter().map(|o| o.total).sum() }
}

/// One row of `GET /top_customers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomerRow {
  pub id:          i64,
  pub name:        String,
  pub order_total: f64,
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
  customers: Vec<CustomerRecord>,
}

impl Dataset {
  pub fn from_json(raw: &str) -> Result<Self, Error> { Ok(serde_json::from_str(raw)?) }

  pub fn load(path: &Path) -> Result<Self, Error> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json(&raw)
  }

  pub fn customer_count(&self) -> usize { self.customers.len() }

  pub fn customer(&self, id: i64) -> Option<&CustomerRecord> {
    self.customers.iter().find(|c| c.id == id)
  }

  /// The `limit` customers with the largest order totals, largest first.
  /// Customers without orders are never listed.
  pub fn top_customers(&self, limit: usize) -> Vec<TopCustomerRow> {
    let mut rows: Vec<TopCustomerRow> = self
      .customers
      .iter()
      .filter(|c| !c.orders.is_empty())
      .map(|c| TopCustomerRow {
        id:          c.id,
        name:        c.name.clone(),
        order_total: c.order_total(),
      })
      .collect();
    rows.sort_by(|a, b| b.order_total.total_cmp(&a.order_total).then(a.id.cmp(&b.id)));
    rows.truncate(limit);
    rows
  }

  /// Summarise one customer's orders. `None` if the customer is unknown or
  /// has never ordered.
  pub fn order_summary(&self, id: i64) -> Option<OrderSummaryPayload> {
    let customer = self.customer(id)?;
    let first = customer.orders.iter().map(|o| o.date).min()?;
    let last = customer.orders.iter().map(|o| o.date).max()?;

    let mut monthly: BTreeMap<Period, f64> = BTreeMap::new();
    for order in &customer.orders {
      *monthly.entry(Period::containing(order.date)).or_default() += order.total;
    }
    let (ticks, totals): (Vec<String>, Vec<RawAmount>) = monthly
      .into_iter()
      .map(|(period, total)| (period.to_string(), RawAmount::from(total)))
      .unzip();

    Some(OrderSummaryPayload {
      name:               customer.name.clone(),
      first_order_date:   first.format("%Y-%m-%d").to_string(),
      last_order_date:    last.format("%Y-%m-%d").to_string(),
      total_orders_value: RawAmount::from(customer.order_total()),
      order_history:      OrderHistoryPayload { ticks, totals },
    })
  }
}
