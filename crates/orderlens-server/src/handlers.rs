//! Route handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/top_customers` | Ten largest customers by order total |
//! | `GET`  | `/customer/{id}` | 404 if unknown |
//! | `GET`  | `/customer/{id}/order_summary` | 404 if no orders |

use axum::{
  Json,
  extract::{Path, State},
};
use orderlens_core::summary::OrderSummaryPayload;

use crate::{
  AppState,
  auth::Authorized,
  dataset::{CustomerRecord, TOP_CUSTOMERS, TopCustomerRow},
  error::Error,
};

/// `GET /top_customers`
pub async fn top_customers(
  _auth: Authorized,
  State(state): State<AppState>,
) -> Json<Vec<TopCustomerRow>> {
  Json(state.dataset.top_customers(TOP_CUSTOMERS))
}

/// `GET /customer/{id}`
pub async fn customer(
  _auth: Authorized,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<CustomerRecord>, Error> {
  state
    .dataset
    .customer(id)
    .cloned()
    .map(Json)
    .ok_or_else(|| Error::NotFound("Customer not found".into()))
}

/// `GET /customer/{id}/order_summary`
pub async fn order_summary(
  _auth: Authorized,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<OrderSummaryPayload>, Error> {
  state
    .dataset
    .order_summary(id)
    .map(Json)
    .ok_or_else(|| Error::NotFound("No orders found for this customer".into()))
}
