//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use orderlens_core::{
  customer::{CustomerProfile, TopCustomer},
  load::LoadState,
  loader::{Activation, Loader},
  source::OrderSource,
  summary::OrderSummary,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the customer list; right pane is empty.
  CustomerList,
  /// Focus on the order summary pane.
  OrderSummary,
}

// ─── Detail ───────────────────────────────────────────────────────────────────

/// The open order-summary view. Dropping it cancels both of its loads.
pub struct Detail {
  pub customer: TopCustomer,
  pub summary:  Activation<OrderSummary>,
  pub profile:  Activation<CustomerProfile>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The top-customers load, started on construction.
  pub customers: Activation<Vec<TopCustomer>>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* customer list.
  pub list_cursor: usize,

  /// The customer whose summary is open, if any.
  pub detail: Option<Detail>,

  loader: Loader<S>,
}

impl<S> App<S>
where
  S: OrderSource + 'static,
{
  /// Create an [`App`] and start loading the customer list.
  pub fn new(loader: Loader<S>) -> Self {
    Self {
      screen: Screen::CustomerList,
      customers: loader.top_customers(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail: None,
      loader,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Restart the customer-list load. The previous one is cancelled.
  pub fn reload_customers(&mut self) {
    self.customers = self.loader.top_customers();
    self.list_cursor = 0;
  }

  /// Open the summary view for `customer`, replacing (and cancelling) any
  /// view already open.
  fn open_detail(&mut self, customer: TopCustomer) {
    let summary = self.loader.order_summary(customer.id.clone());
    let profile = self.loader.customer(customer.id.clone());
    self.detail = Some(Detail { customer, summary, profile });
    self.screen = Screen::OrderSummary;
  }

  fn close_detail(&mut self) {
    self.detail = None;
    self.screen = Screen::CustomerList;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match self.screen {
      Screen::CustomerList => self.handle_list_key(key),
      Screen::OrderSummary => self.handle_detail_key(key),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let mut list = self.filtered_customers();
        if list.len() == 1
          && let Some(customer) = list.pop()
        {
          self.open_detail(customer);
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        self.move_cursor(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.move_cursor(-1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(customer) = self.cursor_customer() {
          self.open_detail(customer);
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => self.reload_customers(),

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Close: the view goes away, and with it any load still in flight.
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),

      // Step through the list without leaving the detail pane.
      KeyCode::Char(']') | KeyCode::PageDown | KeyCode::Down | KeyCode::Char('j') => {
        if self.move_cursor(1)
          && let Some(customer) = self.cursor_customer()
        {
          self.open_detail(customer);
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp | KeyCode::Up | KeyCode::Char('k') => {
        if self.move_cursor(-1)
          && let Some(customer) = self.cursor_customer()
        {
          self.open_detail(customer);
        }
      }

      _ => {}
    }
    true
  }
}

impl<S> App<S> {
  /// Progress of whichever load is still outstanding, for the status bar.
  /// `None` once everything on screen has settled successfully.
  pub fn status(&self) -> Option<String> {
    match &*self.customers.state() {
      LoadState::Idle | LoadState::Pending => {
        return Some("Fetching top customers…".into());
      }
      LoadState::Failed(reason) => return Some(format!("{reason}  (r to retry)")),
      LoadState::Ready(_) => {}
    }
    let detail = self.detail.as_ref()?;
    detail
      .summary
      .state()
      .is_pending()
      .then(|| format!("Fetching orders for {}…", detail.customer.name))
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Customers matching the current filter query. Empty until the list has
  /// loaded.
  pub fn filtered_customers(&self) -> Vec<TopCustomer> {
    let state = self.customers.state();
    let LoadState::Ready(all) = &*state else {
      return Vec::new();
    };
    if self.filter.is_empty() {
      return all.clone();
    }
    let matcher = SkimMatcherV2::default();
    all
      .iter()
      .filter(|c| {
        matcher.fuzzy_match(&c.name, &self.filter).is_some()
          || matcher.fuzzy_match(c.id.as_str(), &self.filter).is_some()
      })
      .cloned()
      .collect()
  }

  /// The customer under the list cursor in the filtered view, if any.
  pub fn cursor_customer(&self) -> Option<TopCustomer> {
    self.filtered_customers().into_iter().nth(self.list_cursor)
  }

  /// Move the cursor by `delta` within the filtered list. Returns whether it
  /// moved.
  fn move_cursor(&mut self, delta: isize) -> bool {
    let len = self.filtered_customers().len();
    let next = self.list_cursor.checked_add_signed(delta);
    match next {
      Some(next) if next < len && next != self.list_cursor => {
        self.list_cursor = next;
        true
      }
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use chrono::NaiveDate;
  use orderlens_core::{Result, customer::CustomerId, summary::OrderHistoryRaw};

  use super::*;

  /// Serves a fixed list; summaries hang until the test's future is dropped.
  struct StubSource {
    hang: bool,
  }

  impl OrderSource for StubSource {
    async fn top_customers(&self) -> Result<Vec<TopCustomer>> {
      Ok(
        [(1, "Alpha Traders"), (2, "Beta Supply"), (3, "Gamma Goods")]
          .into_iter()
          .map(|(id, name)| TopCustomer {
            id:          CustomerId::from(id),
            name:        name.into(),
            order_total: None,
          })
          .collect(),
      )
    }

    async fn order_summary(&self, _id: &CustomerId) -> Result<OrderSummary> {
      if self.hang {
        std::future::pending::<()>().await;
      }
      let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
      Ok(OrderSummary {
        customer_name:      "Alpha Traders".into(),
        first_order_date:   date,
        last_order_date:    date,
        total_orders_value: 1.0,
        history:            OrderHistoryRaw::default(),
      })
    }

    async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile> {
      Ok(CustomerProfile {
        id:              id.clone(),
        name:            "Alpha Traders".into(),
        address:         None,
        phone:           None,
        account_balance: None,
        comment:         None,
      })
    }
  }

  async fn app(hang: bool) -> App<StubSource> {
    let mut app = App::new(Loader::new(Arc::new(StubSource { hang })));
    app.customers.settled().await;
    app
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  #[tokio::test]
  async fn list_loads_on_start() {
    let app = app(false).await;
    assert_eq!(app.filtered_customers().len(), 3);
    assert_eq!(app.cursor_customer().unwrap().name, "Alpha Traders");
  }

  #[tokio::test]
  async fn cursor_stays_in_bounds() {
    let mut app = app(false).await;
    app.handle_key(key(KeyCode::Up));
    assert_eq!(app.list_cursor, 0);
    for _ in 0..5 {
      app.handle_key(key(KeyCode::Down));
    }
    assert_eq!(app.list_cursor, 2);
  }

  #[tokio::test]
  async fn enter_opens_summary_and_it_loads() {
    let mut app = app(false).await;
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.screen, Screen::OrderSummary);

    let detail = app.detail.as_mut().unwrap();
    assert_eq!(detail.customer.id, CustomerId::from(1));
    let state = detail.summary.settled().await.unwrap();
    assert_eq!(state.ready().unwrap().customer_name, "Alpha Traders");
  }

  #[tokio::test]
  async fn closing_detail_cancels_pending_load() {
    let mut app = app(true).await;
    app.handle_key(key(KeyCode::Enter));

    let detail = app.detail.as_ref().unwrap();
    assert!(detail.summary.state().is_pending());
    let mut rx = detail.summary.subscribe();
    rx.borrow_and_update();

    app.handle_key(key(KeyCode::Esc));
    assert!(app.detail.is_none());
    assert_eq!(app.screen, Screen::CustomerList);

    tokio::task::yield_now().await;
    assert!(rx.borrow().is_pending());
  }

  #[tokio::test]
  async fn stepping_in_detail_replaces_the_view() {
    let mut app = app(true).await;
    app.handle_key(key(KeyCode::Enter));
    let mut first = app.detail.as_ref().unwrap().summary.subscribe();
    first.borrow_and_update();

    app.handle_key(key(KeyCode::Char(']')));
    let detail = app.detail.as_ref().unwrap();
    assert_eq!(detail.customer.id, CustomerId::from(2));
    assert_eq!(detail.summary.key(), "order_summary/2");

    // The first view's load was cancelled; its state never moves again.
    tokio::task::yield_now().await;
    assert!(first.borrow().is_pending());
  }

  #[tokio::test]
  async fn filter_narrows_and_enter_opens_single_match() {
    let mut app = app(false).await;
    app.handle_key(key(KeyCode::Char('/')));
    for c in "gamma".chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    assert_eq!(app.filtered_customers().len(), 1);

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.screen, Screen::OrderSummary);
    assert_eq!(app.detail.as_ref().unwrap().customer.name, "Gamma Goods");
  }

  #[tokio::test]
  async fn list_keys_move_the_cursor() {
    let mut app = app(false).await;
    assert!(app.handle_key(key(KeyCode::Char('j'))));
    assert!(app.handle_key(key(KeyCode::Down)));
    assert_eq!(app.cursor_customer().unwrap().name, "Gamma Goods");
    assert!(app.handle_key(key(KeyCode::Char('k'))));
    assert_eq!(app.cursor_customer().unwrap().name, "Beta Supply");
  }

  #[tokio::test]
  async fn reload_status_clears_once_list_settles() {
    let mut app = app(false).await;
    assert_eq!(app.status(), None);

    app.handle_key(key(KeyCode::Char('r')));
    assert_eq!(app.status().as_deref(), Some("Fetching top customers…"));

    app.customers.settled().await;
    assert_eq!(app.status(), None);
  }

  #[tokio::test]
  async fn status_tracks_open_summary() {
    let mut app = app(true).await;
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(
      app.status().as_deref(),
      Some("Fetching orders for Alpha Traders…")
    );
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.status(), None);
  }

  #[tokio::test]
  async fn q_quits_from_list_but_not_while_filtering() {
    let mut app = app(false).await;
    app.handle_key(key(KeyCode::Char('/')));
    assert!(app.handle_key(key(KeyCode::Char('q'))));
    app.handle_key(key(KeyCode::Esc));
    assert!(!app.handle_key(key(KeyCode::Char('q'))));
  }
}
