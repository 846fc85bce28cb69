//! Gap-filling: sparse monthly history in, dense chart series out.

use serde::Serialize;

use crate::{
  Error, Result,
  period::{Calendar, Period},
  summary::OrderHistoryRaw,
};

/// One bar of the monthly chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
  pub period: Period,
  pub value:  f64,
}

/// A dense monthly series: one point per month, first tick to last tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ChartSeries {
  pub points: Vec<ChartPoint>,
}

impl ChartSeries {
  pub fn len(&self) -> usize { self.points.len() }

  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  pub fn iter(&self) -> std::slice::Iter<'_, ChartPoint> { self.points.iter() }

  /// Largest value in the series, or `0.0` when empty.
  pub fn max_value(&self) -> f64 {
    self.points.iter().map(|p| p.value).fold(0.0, f64::max)
  }
}

impl<'a> IntoIterator for &'a ChartSeries {
  type IntoIter = std::slice::Iter<'a, ChartPoint>;
  type Item = &'a ChartPoint;

  fn into_iter(self) -> Self::IntoIter { self.points.iter() }
}

/// Expand `history` into one point per calendar month, inserting `0.0` for
/// every month between two ticks that the API skipped.
///
/// Ticks must be well-formed, strictly increasing, and paired one-to-one with
/// totals; anything else is an [`Error::InputContract`].
pub fn normalize<C>(calendar: &C, history: &OrderHistoryRaw) -> Result<ChartSeries>
where
  C: Calendar + ?Sized,
{
  let OrderHistoryRaw { ticks, totals } = history;
  if ticks.len() != totals.len() {
    return Err(Error::InputContract(format!(
      "{} ticks paired with {} totals",
      ticks.len(),
      totals.len()
    )));
  }

  let mut points = Vec::with_capacity(ticks.len());
  let mut cursor: Option<Period> = None;

  for (tick, &value) in ticks.iter().zip(totals) {
    let period = calendar.parse_period(tick)?;

    if let Some(prev) = cursor {
      if period <= prev {
        return Err(Error::InputContract(format!(
          "tick {period} does not follow {prev}"
        )));
      }
      let mut gap = calendar.next_period(prev)?;
      while gap < period {
        points.push(ChartPoint { period: gap, value: 0.0 });
        gap = calendar.next_period(gap)?;
      }
    }

    points.push(ChartPoint { period, value });
    cursor = Some(period);
  }

  Ok(ChartSeries { points })
}
