//! The `OrderSource` trait: where order data comes from.
//!
//! Implemented over HTTP by `orderlens-cli`'s `ApiClient`, and by in-memory
//! fakes in tests. The loader depends on this abstraction only.

use std::future::Future;

use crate::{
  Result,
  customer::{CustomerId, CustomerProfile, TopCustomer},
  summary::OrderSummary,
};

/// A read-only view of the remote orders API.
///
/// Every call is exactly one request; implementations must not retry.
pub trait OrderSource: Send + Sync {
  /// `GET /top_customers`
  fn top_customers(&self) -> impl Future<Output = Result<Vec<TopCustomer>>> + Send + '_;

  /// `GET /customer/{id}/order_summary`
  fn order_summary<'a>(
    &'a self,
    id: &'a CustomerId,
  ) -> impl Future<Output = Result<OrderSummary>> + Send + 'a;

  /// `GET /customer/{id}`
  fn customer<'a>(
    &'a self,
    id: &'a CustomerId,
  ) -> impl Future<Output = Result<CustomerProfile>> + Send + 'a;
}
