//! Order summary pane (right panel).
//!
//! Shows the summary fields once loaded, and the gap-filled monthly history as
//! a column chart.

use chrono::NaiveDate;
use orderlens_core::{
  customer::CustomerProfile,
  load::LoadState,
  period::Gregorian,
  series::{ChartSeries, normalize},
  summary::{OrderHistoryRaw, OrderSummary},
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  symbols,
  text::{Line, Span},
  widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
};

use crate::app::Detail;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the order summary for `detail` into `area`.
pub fn draw(f: &mut Frame, area: Rect, detail: &Detail) {
  let block = Block::default()
    .title(format!(" {} ", detail.customer.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  // Copy out of the watch guard so the loader is never blocked on rendering.
  let summary = match &*detail.summary.state() {
    LoadState::Idle | LoadState::Pending => Err(("Loading…".to_string(), Color::DarkGray)),
    LoadState::Failed(reason) => {
      Err((format!("Could not load order summary: {reason}"), Color::Red))
    }
    LoadState::Ready(summary) => Ok(summary.clone()),
  };
  let summary = match summary {
    Ok(summary) => summary,
    Err((text, color)) => {
      f.render_widget(
        Paragraph::new(text)
          .style(Style::default().fg(color))
          .wrap(Wrap { trim: true }),
        inner,
      );
      return;
    }
  };
  let profile = detail.profile.state().ready().cloned();

  let mut lines = summary_lines(&summary);
  if let Some(profile) = &profile {
    lines.extend(profile_lines(profile));
  }

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(lines.len() as u16 + 1),
      Constraint::Min(0),
    ])
    .split(inner);

  f.render_widget(Paragraph::new(lines), rows[0]);
  draw_chart(f, rows[1], &summary.history);
}

// ─── Fields ───────────────────────────────────────────────────────────────────

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<24}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn summary_lines(summary: &OrderSummary) -> Vec<Line<'static>> {
  vec![
    field("Name:", summary.customer_name.clone()),
    field("First order placed on:", format_date(summary.first_order_date)),
    field("Last order date:", format_date(summary.last_order_date)),
    field("Total all orders value:", format_money(summary.total_orders_value)),
  ]
}

fn profile_lines(profile: &CustomerProfile) -> Vec<Line<'static>> {
  [
    ("Phone:", profile.phone.clone()),
    ("Address:", profile.address.clone()),
    ("Account balance:", profile.account_balance.map(format_money)),
  ]
  .into_iter()
  .filter_map(|(label, value)| value.map(|v| field(label, v)))
  .collect()
}

// ─── Chart ────────────────────────────────────────────────────────────────────

fn draw_chart(f: &mut Frame, area: Rect, history: &OrderHistoryRaw) {
  let block = Block::default()
    .title(" Monthly Order History ")
    .borders(Borders::TOP)
    .border_style(Style::default().fg(Color::DarkGray));

  let series = match normalize(&Gregorian, history) {
    Ok(series) if !series.is_empty() => series,
    Ok(_) => {
      f.render_widget(
        Paragraph::new("No orders to chart.")
          .style(Style::default().fg(Color::DarkGray))
          .block(block),
        area,
      );
      return;
    }
    Err(e) => {
      f.render_widget(
        Paragraph::new(format!("Chart unavailable: {e}"))
          .style(Style::default().fg(Color::Red))
          .block(block),
        area,
      );
      return;
    }
  };

  let points: Vec<(f64, f64)> = series
    .iter()
    .enumerate()
    .map(|(i, p)| (i as f64, p.value))
    .collect();
  let last = (series.len() - 1) as f64;
  let y_max = series.max_value().max(1.0) * 1.1;

  let dataset = Dataset::default()
    .marker(symbols::Marker::HalfBlock)
    .graph_type(GraphType::Bar)
    .style(Style::default().fg(Color::Blue))
    .data(&points);

  let chart = Chart::new(vec![dataset])
    .block(block)
    .x_axis(
      Axis::default()
        .title("Period")
        .style(Style::default().fg(Color::Gray))
        .bounds([-0.5, last + 0.5])
        .labels(period_labels(&series)),
    )
    .y_axis(
      Axis::default()
        .title("Total")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, y_max])
        .labels([
          "0".to_string(),
          group_thousands((y_max / 2.0).round() as u64),
          group_thousands(y_max.round() as u64),
        ]),
    );
  f.render_widget(chart, area);
}

/// Labels for the x axis: every period for short series, otherwise the first,
/// middle, and last.
fn period_labels(series: &ChartSeries) -> Vec<String> {
  let points = &series.points;
  if points.len() <= 3 {
    return points.iter().map(|p| p.period.to_string()).collect();
  }
  [0, points.len() / 2, points.len() - 1]
    .into_iter()
    .map(|i| points[i].period.to_string())
    .collect()
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String { date.format("%d/%m/%Y").to_string() }

/// Dollars with thousands separators and two decimals, e.g. `$1,234.50`.
pub fn format_money(value: f64) -> String {
  let cents = (value.abs() * 100.0).round() as u64;
  let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
  format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

fn group_thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}
