//! Activations: one fetch, one outcome, scoped to whoever asked for it.
//!
//! [`Activation::spawn`] moves the load to `Pending`, runs the fetch on the
//! tokio runtime, and publishes every transition on a `watch` channel. The
//! owning view holds the [`Activation`]; cancelling or dropping it withdraws
//! interest, after which the fetch's outcome is thrown away unseen.

use std::{
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use tokio::{
  sync::watch,
  task::{AbortHandle, JoinHandle},
};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  customer::{CustomerId, CustomerProfile, TopCustomer},
  load::{LoadEvent, LoadState},
  source::OrderSource,
  summary::OrderSummary,
};

// ─── Slot ────────────────────────────────────────────────────────────────────

/// The published state plus the interest flag guarding it.
///
/// A commit holds the flag's lock for its whole duration, so a cancel either
/// lands before the commit (which then does nothing) or after it.
struct Slot<T> {
  interested: Mutex<bool>,
  state:      watch::Sender<LoadState<T>>,
}

impl<T> Slot<T> {
  fn new(state: watch::Sender<LoadState<T>>) -> Self {
    Self { interested: Mutex::new(true), state }
  }

  /// Apply `event` and publish the result. Returns whether anything changed.
  fn commit(&self, key: &str, event: LoadEvent<T>) -> bool {
    let interested = self.interested.lock().unwrap_or_else(PoisonError::into_inner);
    if !*interested {
      debug!(key, event = event.name(), "activation withdrawn, discarding");
      return false;
    }

    let next = self.state.borrow().apply(event);
    match next {
      Ok(next) => {
        debug!(key, state = next.name(), "load transition");
        self.state.send_replace(next);
        true
      }
      Err(e) => {
        warn!(key, error = %e, "refusing load transition");
        false
      }
    }
  }

  /// Clear the interest flag. Returns whether it was still set.
  fn withdraw(&self) -> bool {
    let mut interested = self.interested.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *interested, false)
  }

  fn is_withdrawn(&self) -> bool {
    !*self.interested.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

// ─── Activation ──────────────────────────────────────────────────────────────

/// Handle to a single in-flight load.
///
/// Dropping the handle cancels it.
pub struct Activation<T> {
  key:   String,
  slot:  Arc<Slot<T>>,
  state: watch::Receiver<LoadState<T>>,
  fetch: AbortHandle,
  task:  JoinHandle<()>,
}

impl<T> Activation<T>
where
  T: Send + Sync + 'static,
{
  /// Start a load keyed by `key` (used for logging and by callers to tell
  /// activations apart). The state is `Pending` by the time this returns.
  ///
  /// Must be called from within a tokio runtime.
  pub fn spawn<F>(key: impl Into<String>, fetch: F) -> Self
  where
    F: Future<Output = Result<T>> + Send + 'static,
  {
    let key = key.into();
    let (tx, rx) = watch::channel(LoadState::Idle);
    let slot = Arc::new(Slot::new(tx));
    slot.commit(&key, LoadEvent::Start);

    // The fetch runs in its own task so a panic inside it still resolves the
    // load instead of leaving it pending.
    let fetch = tokio::spawn(fetch);
    let fetch_handle = fetch.abort_handle();
    let task = tokio::spawn({
      let slot = Arc::clone(&slot);
      let key = key.clone();
      async move {
        let outcome = match fetch.await {
          Ok(outcome) => outcome,
          Err(e) if e.is_panic() => {
            warn!(key = %key, "fetch panicked");
            Err(Error::Transport("fetch task panicked".into()))
          }
          Err(_) => return,
        };
        slot.commit(&key, LoadEvent::Resolve(outcome));
      }
    });

    Self { key, slot, state: rx, fetch: fetch_handle, task }
  }
}

impl<T> Activation<T> {
  pub fn key(&self) -> &str { &self.key }

  /// Borrow the current state. Hold the guard briefly: it blocks the commit of
  /// the next transition.
  pub fn state(&self) -> watch::Ref<'_, LoadState<T>> { self.state.borrow() }

  /// A receiver for observers that want to await transitions themselves.
  pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> { self.state.clone() }

  /// Wait for the load to settle and return a copy of the final state.
  ///
  /// Returns `None` if the activation was cancelled before it settled.
  pub async fn settled(&mut self) -> Option<LoadState<T>>
  where
    T: Clone,
  {
    if self.slot.is_withdrawn() {
      let current = self.state.borrow();
      return current.is_settled().then(|| (*current).clone());
    }
    self
      .state
      .wait_for(LoadState::is_settled)
      .await
      .ok()
      .map(|state| (*state).clone())
  }

  /// Withdraw interest and abort the fetch. Idempotent.
  pub fn cancel(&self) {
    if self.slot.withdraw() {
      debug!(key = %self.key, "activation cancelled");
    }
    self.fetch.abort();
    self.task.abort();
  }

  pub fn is_cancelled(&self) -> bool { self.slot.is_withdrawn() }
}

impl<T> Drop for Activation<T> {
  fn drop(&mut self) { self.cancel(); }
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// Starts activations against an [`OrderSource`].
pub struct Loader<S> {
  source: Arc<S>,
}

impl<S> Clone for Loader<S> {
  fn clone(&self) -> Self { Self { source: Arc::clone(&self.source) } }
}

impl<S> Loader<S>
where
  S: OrderSource + 'static,
{
  pub fn new(source: Arc<S>) -> Self { Self { source } }

  /// Fetch the order summary for `id`.
  pub fn order_summary(&self, id: CustomerId) -> Activation<OrderSummary> {
    let source = Arc::clone(&self.source);
    Activation::spawn(format!("order_summary/{id}"), async move {
      source.order_summary(&id).await
    })
  }

  /// Fetch the top-customers list.
  pub fn top_customers(&self) -> Activation<Vec<TopCustomer>> {
    let source = Arc::clone(&self.source);
    Activation::spawn("top_customers", async move { source.top_customers().await })
  }

  /// Fetch the profile for `id`.
  pub fn customer(&self, id: CustomerId) -> Activation<CustomerProfile> {
    let source = Arc::clone(&self.source);
    Activation::spawn(format!("customer/{id}"), async move {
      source.customer(&id).await
    })
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
  };

  use chrono::NaiveDate;
  use tokio::sync::oneshot;

  use super::*;
  use crate::summary::OrderHistoryRaw;

  /// An order source whose summary response is released by the test.
  struct DeferredSource {
    calls:   AtomicUsize,
    pending: Mutex<Option<oneshot::Receiver<Result<OrderSummary>>>>,
  }

  impl DeferredSource {
    fn new() -> (Arc<Self>, oneshot::Sender<Result<OrderSummary>>) {
      let (tx, rx) = oneshot::channel();
      let source = Self {
        calls:   AtomicUsize::new(0),
        pending: Mutex::new(Some(rx)),
      };
      (Arc::new(source), tx)
    }
  }

  impl OrderSource for DeferredSource {
    async fn top_customers(&self) -> Result<Vec<TopCustomer>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![TopCustomer {
        id:          CustomerId::from(1),
        name:        "Customer#1".into(),
        order_total: Some(10.0),
      }])
    }

    async fn order_summary(&self, _id: &CustomerId) -> Result<OrderSummary> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let pending = self.pending.lock().unwrap().take();
      match pending {
        Some(rx) => rx
          .await
          .unwrap_or_else(|_| Err(Error::Transport("response dropped".into()))),
        None => Err(Error::Transport("no response queued".into())),
      }
    }

    async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile> {
      Err(Error::Http { status: 404, message: format!("customer {id} not found") })
    }
  }

  fn summary() -> OrderSummary {
    OrderSummary {
      customer_name:      "Customer#000000001".into(),
      first_order_date:   NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(),
      last_order_date:    NaiveDate::from_ymd_opt(2023, 4, 20).unwrap(),
      total_orders_value: 500.0,
      history:            OrderHistoryRaw {
        ticks:  vec!["2023-01".into(), "2023-04".into()],
        totals: vec![100.0, 400.0],
      },
    }
  }

  #[tokio::test]
  async fn activation_is_pending_until_resolved() {
    let (source, release) = DeferredSource::new();
    let loader = Loader::new(Arc::clone(&source));

    let mut activation = loader.order_summary(CustomerId::from(1));
    assert!(activation.state().is_pending());
    assert_eq!(activation.key(), "order_summary/1");

    release.send(Ok(summary())).unwrap();
    let settled = activation.settled().await.unwrap();
    assert_eq!(settled, LoadState::Ready(summary()));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
  }

  async fn explode() -> Result<u32> { panic!("fetch blew up") }

  #[tokio::test]
  async fn panicking_fetch_settles_as_failed() {
    let mut activation = Activation::spawn("explodes", explode());

    let settled = tokio::time::timeout(Duration::from_secs(1), activation.settled())
      .await
      .expect("activation never settled")
      .unwrap();
    assert_eq!(
      settled.failure(),
      Some(&Error::Transport("fetch task panicked".into()))
    );
  }

  #[tokio::test]
  async fn failure_settles_as_failed() {
    let (source, release) = DeferredSource::new();
    let loader = Loader::new(source);

    let mut activation = loader.order_summary(CustomerId::from(1));
    release
      .send(Err(Error::Http { status: 500, message: "boom".into() }))
      .unwrap();

    let settled = activation.settled().await.unwrap();
    assert!(settled.ready().is_none());
    assert_eq!(
      settled.failure(),
      Some(&Error::Http { status: 500, message: "boom".into() })
    );
  }

  #[tokio::test]
  async fn observers_see_every_transition_in_order() {
    let (source, release) = DeferredSource::new();
    let loader = Loader::new(source);

    let activation = loader.order_summary(CustomerId::from(1));
    let mut rx = activation.subscribe();
    assert_eq!(*rx.borrow_and_update(), LoadState::Pending);

    release.send(Ok(summary())).unwrap();
    rx.changed().await.unwrap();
    assert!(matches!(*rx.borrow_and_update(), LoadState::Ready(_)));
  }

  #[tokio::test]
  async fn cancelled_activation_ignores_late_response() {
    let (source, release) = DeferredSource::new();
    let loader = Loader::new(source);

    let mut activation = loader.order_summary(CustomerId::from(1));
    let mut rx = activation.subscribe();
    rx.borrow_and_update();

    // Let the fetch reach its suspension point before the view goes away.
    tokio::task::yield_now().await;
    activation.cancel();
    let _ = release.send(Ok(summary()));
    for _ in 0..5 {
      tokio::task::yield_now().await;
    }

    assert!(activation.is_cancelled());
    assert_eq!(*activation.state(), LoadState::Pending);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(activation.settled().await, None);
  }

  #[tokio::test]
  async fn dropped_activation_never_publishes() {
    let (source, release) = DeferredSource::new();
    let loader = Loader::new(source);

    let activation = loader.order_summary(CustomerId::from(1));
    let mut rx = activation.subscribe();
    rx.borrow_and_update();
    drop(activation);

    let _ = release.send(Ok(summary()));
    for _ in 0..5 {
      tokio::task::yield_now().await;
    }
    assert_eq!(*rx.borrow(), LoadState::Pending);
  }

  #[test]
  fn withdrawn_slot_refuses_commits() {
    let (tx, rx) = watch::channel(LoadState::Idle);
    let slot = Slot::new(tx);
    assert!(slot.commit("k", LoadEvent::Start));

    assert!(slot.withdraw());
    assert!(!slot.withdraw());
    assert!(!slot.commit("k", LoadEvent::Resolve(Ok(1_u32))));
    assert_eq!(*rx.borrow(), LoadState::Pending);
  }

  #[test]
  fn slot_refuses_out_of_order_events() {
    let (tx, rx) = watch::channel(LoadState::Idle);
    let slot = Slot::new(tx);
    assert!(!slot.commit("k", LoadEvent::Resolve(Ok(1_u32))));
    assert_eq!(*rx.borrow(), LoadState::Idle);
  }

  #[tokio::test]
  async fn top_customers_use_the_same_lifecycle() {
    let (source, _release) = DeferredSource::new();
    let loader = Loader::new(source);

    let mut activation = loader.top_customers();
    let settled = activation.settled().await.unwrap();
    assert_eq!(settled.ready().map(Vec::len), Some(1));
  }

  #[tokio::test]
  async fn profile_failures_surface_status() {
    let (source, _release) = DeferredSource::new();
    let loader = Loader::new(source);

    let mut activation = loader.customer(CustomerId::from(9));
    let settled = activation.settled().await.unwrap();
    assert!(matches!(settled.failure(), Some(Error::Http { status: 404, .. })));
  }
}
