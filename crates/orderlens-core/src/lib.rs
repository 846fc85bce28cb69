//! Core types and the load/normalize pipeline for orderlens.
//!
//! This crate is deliberately free of HTTP dependencies. The HTTP client
//! lives in `orderlens-cli` and plugs in through [`source::OrderSource`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod amount;
pub mod customer;
pub mod error;
pub mod load;
pub mod loader;
pub mod period;
pub mod series;
pub mod source;
pub mod summary;

pub use error::{Error, Result};
