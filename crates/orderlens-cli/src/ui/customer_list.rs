//! Top-customers pane (left panel).

use orderlens_core::load::LoadState;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::order_summary::format_money;
use crate::app::App;

/// Render the customer list into `area`.
pub fn draw<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  // Anything but a loaded list is a single message.
  let message = match &*app.customers.state() {
    LoadState::Idle | LoadState::Pending => Some(("Loading…".to_string(), Color::DarkGray)),
    LoadState::Failed(reason) => Some((format!("Could not load customers: {reason}"), Color::Red)),
    LoadState::Ready(_) => None,
  };
  if let Some((text, color)) = message {
    let block = block.title(" Top customers ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true }),
      inner,
    );
    return;
  }

  let filtered = app.filtered_customers();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Top customers ({} matching) ", filtered.len())
  } else {
    format!(" Top customers ({}) ", filtered.len())
  };
  let block = block.title(title);

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|customer| {
      let mut spans = vec![Span::raw(customer.name.clone())];
      if let Some(total) = customer.order_total {
        spans.push(Span::styled(
          format!("  {}", format_money(total)),
          Style::default().fg(Color::DarkGray),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // If filter is active or set, show a filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
