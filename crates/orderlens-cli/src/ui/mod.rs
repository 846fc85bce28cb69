//! Frame layout: title bar, the two panes, and a footer.

pub mod customer_list;
pub mod order_summary;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

/// Render one frame.
pub fn draw<S>(f: &mut Frame, app: &App<S>) {
  let [title, body, footer] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(0),
    Constraint::Length(1),
  ])
  .areas(f.area());

  draw_title(f, title, app);

  let [list, detail] =
    Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(body);
  customer_list::draw(f, list, app);
  match &app.detail {
    Some(detail_view) => order_summary::draw(f, detail, detail_view),
    None => draw_placeholder(f, detail),
  }

  draw_footer(f, footer, app);
}

// ─── Title bar ────────────────────────────────────────────────────────────────

/// Breadcrumb on the left, today's date on the right.
fn draw_title<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let bar = Style::default().bg(Color::Blue).fg(Color::White);

  let mut crumbs = vec![
    Span::from(" orderlens ").add_modifier(Modifier::BOLD),
    Span::from("› Top customers"),
  ];
  if let Some(detail) = &app.detail {
    crumbs.push(Span::from(format!(" › {}", detail.customer.name)));
  }

  f.render_widget(Paragraph::new(Line::from(crumbs)).style(bar), area);
  f.render_widget(
    Paragraph::new(format!("{} ", Local::now().format("%d/%m/%Y")))
      .right_aligned()
      .style(bar),
    area,
  );
}

fn draw_placeholder(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Orders Summary ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new("Pick a customer on the left to see their order history.")
      .fg(Color::DarkGray)
      .block(block),
    area,
  );
}

// ─── Footer ───────────────────────────────────────────────────────────────────

fn draw_footer<S>(f: &mut Frame, area: Rect, app: &App<S>) {
  let keys = match app.screen {
    Screen::CustomerList if app.filter_active => "type to filter · Enter open · Esc clear",
    Screen::CustomerList => "j/k move · Enter open · / filter · r reload · q quit",
    Screen::OrderSummary => "[ ] previous/next customer · Esc back · q quit",
  };

  // A load in progress (or a failed list) takes precedence over the key help.
  let line = match app.status() {
    Some(status) => Line::from(Span::from(format!(" {status}")).fg(Color::Yellow)),
    None => Line::from(Span::from(format!(" {keys}")).fg(Color::Gray)),
  };
  f.render_widget(Paragraph::new(line).bg(Color::Black), area);
}
