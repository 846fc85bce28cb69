//! Calendar months and the date-parsing capability used by the normalizer.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

// ─── Period ──────────────────────────────────────────────────────────────────

/// A calendar month, stored as its first day.
///
/// Renders and parses as `YYYY-MM`. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
  /// Returns `None` when `month` is outside `1..=12` or `year` is out of
  /// chrono's range.
  pub fn from_ym(year: i32, month: u32) -> Option<Self> {
    NaiveDate::from_ymd_opt(year, month, 1).map(Self)
  }

  /// The month containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    Self(date - Days::new(u64::from(date.day0())))
  }

  pub fn year(&self) -> i32 { self.0.year() }

  pub fn month(&self) -> u32 { self.0.month() }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year(), self.month())
  }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Gregorian.parse_period(s) }
}

impl Serialize for Period {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Period {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Calendar capability ─────────────────────────────────────────────────────

/// Turns period labels into months and steps between them.
///
/// Injected into [`normalize`](crate::series::normalize) so tests can swap in
/// their own calendar.
pub trait Calendar {
  /// Parse a `YYYY-MM` label. Anything else is an
  /// [`Error::InputContract`].
  fn parse_period(&self, label: &str) -> Result<Period>;

  /// The month immediately after `period`.
  fn next_period(&self, period: Period) -> Result<Period>;
}

/// The proleptic Gregorian calendar, backed by chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gregorian;

impl Calendar for Gregorian {
  fn parse_period(&self, label: &str) -> Result<Period> {
    let bytes = label.as_bytes();
    let shaped = bytes.len() == 7
      && bytes[4] == b'-'
      && bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || b.is_ascii_digit());
    if !shaped {
      return Err(Error::InputContract(format!(
        "period label {label:?} is not in YYYY-MM form"
      )));
    }

    NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d")
      .map(Period)
      .map_err(|_| {
        Error::InputContract(format!("period label {label:?} names no calendar month"))
      })
  }

  fn next_period(&self, period: Period) -> Result<Period> {
    period
      .0
      .checked_add_months(Months::new(1))
      .map(Period)
      .ok_or_else(|| Error::InputContract(format!("no month follows {period}")))
  }
}
