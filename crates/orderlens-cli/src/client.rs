//! Async HTTP client for the orders API.

use std::time::Duration;

use anyhow::Context;
use orderlens_core::{
  Error, Result,
  customer::{CustomerId, CustomerProfile, TopCustomer},
  source::OrderSource,
  summary::OrderSummary,
};
use reqwest::{Client, Url};
use serde::Deserialize;

/// Connection settings for the orders API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token attached to every request. Empty means none is sent.
  pub token:    String,
}

/// Async HTTP client for the orders REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  base:   Url,
  token:  String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    let base = Url::parse(&config.base_url)
      .with_context(|| format!("invalid API base URL {:?}", config.base_url))?;
    if base.cannot_be_a_base() {
      anyhow::bail!("API base URL {:?} cannot carry a path", config.base_url);
    }
    Ok(Self { client, base, token: config.token })
  }

  /// Base URL with `segments` appended, each percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.token.is_empty() {
      req
    } else {
      req.bearer_auth(&self.token)
    }
  }

  /// One GET, no retries. Non-2xx becomes [`Error::Http`], anything that
  /// stops the body arriving becomes [`Error::Transport`].
  async fn get(&self, segments: &[&str]) -> Result<Vec<u8>> {
    let url = self.url(segments);
    tracing::debug!(%url, "GET");

    let resp = self
      .auth(self.client.get(url.clone()))
      .send()
      .await
      .map_err(|e| Error::Transport(format!("GET {url} failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      let message = error_detail(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());
      return Err(Error::Http { status: status.as_u16(), message });
    }

    resp
      .bytes()
      .await
      .map(|b| b.to_vec())
      .map_err(|e| Error::Transport(format!("reading body of GET {url}: {e}")))
  }
}

/// Pull the `detail` message out of an error body, if it has one.
fn error_detail(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct Detail {
    detail: String,
  }
  serde_json::from_str::<Detail>(body).ok().map(|d| d.detail)
}

impl OrderSource for ApiClient {
  async fn top_customers(&self) -> Result<Vec<TopCustomer>> {
    let body = self.get(&["top_customers"]).await?;
    Ok(serde_json::from_slice(&body)?)
  }

  async fn order_summary(&self, id: &CustomerId) -> Result<OrderSummary> {
    let body = self.get(&["customer", id.as_str(), "order_summary"]).await?;
    OrderSummary::from_json(&body)
  }

  async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile> {
    let body = self.get(&["customer", id.as_str()]).await?;
    Ok(serde_json::from_slice(&body)?)
  }
}
