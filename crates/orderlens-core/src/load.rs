//! The load state machine.
//!
//! A load moves `Idle -> Pending -> Ready | Failed` and nowhere else. States
//! are values: [`LoadState::apply`] never touches `self`, it returns the next
//! state or refuses the event.

use crate::{Error, Result};

/// Where one fetch stands.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
  /// Not started.
  Idle,
  /// Request in flight.
  Pending,
  Ready(T),
  Failed(Error),
}

/// What can happen to a load.
#[derive(Debug)]
pub enum LoadEvent<T> {
  /// The request is about to be issued.
  Start,
  /// The request finished, one way or the other.
  Resolve(Result<T>),
}

impl<T> LoadEvent<T> {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Start => "start",
      Self::Resolve(Ok(_)) => "success",
      Self::Resolve(Err(_)) => "failure",
    }
  }
}

impl<T> Default for LoadState<T> {
  fn default() -> Self { Self::Idle }
}

impl<T> LoadState<T> {
  /// Compute the state that follows `event`.
  ///
  /// Returns [`Error::InvalidTransition`] for anything other than
  /// `Idle + Start` or `Pending + Resolve`.
  pub fn apply(&self, event: LoadEvent<T>) -> Result<Self> {
    match (self, event) {
      (Self::Idle, LoadEvent::Start) => Ok(Self::Pending),
      (Self::Pending, LoadEvent::Resolve(Ok(value))) => Ok(Self::Ready(value)),
      (Self::Pending, LoadEvent::Resolve(Err(reason))) => Ok(Self::Failed(reason)),
      (from, event) => Err(Error::InvalidTransition {
        from:  from.name(),
        event: event.name(),
      }),
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::Pending => "pending",
      Self::Ready(_) => "ready",
      Self::Failed(_) => "failed",
    }
  }

  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }

  /// `true` once the load is `Ready` or `Failed`.
  pub fn is_settled(&self) -> bool { matches!(self, Self::Ready(_) | Self::Failed(_)) }

  pub fn ready(&self) -> Option<&T> {
    match self {
      Self::Ready(value) => Some(value),
      _ => None,
    }
  }

  pub fn failure(&self) -> Option<&Error> {
    match self {
      Self::Failed(reason) => Some(reason),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn happy_path() {
    let idle = LoadState::<u32>::Idle;
    let pending = idle.apply(LoadEvent::Start).unwrap();
    assert_eq!(pending, LoadState::Pending);
    let ready = pending.apply(LoadEvent::Resolve(Ok(7))).unwrap();
    assert_eq!(ready.ready(), Some(&7));
    assert!(ready.is_settled());

    // The earlier values are untouched.
    assert_eq!(idle, LoadState::Idle);
    assert_eq!(pending, LoadState::Pending);
  }

  #[test]
  fn failure_keeps_reason() {
    let failed = LoadState::<u32>::Pending
      .apply(LoadEvent::Resolve(Err(Error::Http {
        status:  404,
        message: "not found".into(),
      })))
      .unwrap();
    assert_eq!(failed.name(), "failed");
    assert!(failed.ready().is_none());
    assert_eq!(failed.failure().unwrap().to_string(), "HTTP 404: not found");
  }

  #[test]
  fn skipping_or_reordering_is_refused() {
    let cases: Vec<(LoadState<u32>, LoadEvent<u32>)> = vec![
      (LoadState::Idle, LoadEvent::Resolve(Ok(1))),
      (LoadState::Pending, LoadEvent::Start),
      (LoadState::Ready(1), LoadEvent::Start),
      (LoadState::Ready(1), LoadEvent::Resolve(Ok(2))),
      (LoadState::Failed(Error::Transport("x".into())), LoadEvent::Resolve(Ok(2))),
    ];
    for (state, event) in cases {
      let err = state.apply(event).unwrap_err();
      assert!(matches!(err, Error::InvalidTransition { .. }), "{state:?}");
    }
  }
}
