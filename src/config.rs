//! Timestamp layout configuration.
//!
//! Parsing tries an ordered list of layouts. The list can be passed
//! explicitly (`Timestamp::parse_with`, `as_timestamp_with` on the variants)
//! or taken from the process-wide default returned by
//! [`TimeLayouts::current`].
//!
//! The process-wide default is read-mostly configuration. Set it while the
//! program initializes; replacing it while other threads are parsing is
//! memory safe, but which list a concurrent parse observes is unspecified and
//! is the caller's responsibility.

use std::fmt::Write;
use std::sync::{OnceLock, PoisonError, RwLock};

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use faststr::FastStr;

use crate::error::{Error, Result};

/// A single layout a timestamp may be written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TimeLayout {
    /// RFC 3339, with fractional seconds written only when present.
    ///
    /// Years beyond 9999 are written with a sign, as in
    /// `+10000-01-01T00:00:00Z`, which this layout does not parse back.
    #[default]
    Rfc3339,
    /// RFC 2822, as used in e-mail headers.
    ///
    /// Only years 0 to 9999 can be written. Other timestamps are written as
    /// RFC 3339 instead.
    Rfc2822,
    /// A `chrono` strftime pattern, such as `%Y-%m-%d %H:%M:%S`.
    ///
    /// Patterns without an offset are read as UTC, patterns without a time
    /// are read as midnight UTC.
    Custom(FastStr),
}

impl TimeLayout {
    /// A strftime layout. Fails with `InvalidValue` if the pattern holds an
    /// unknown specifier.
    pub fn custom(pattern: impl Into<FastStr>) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(Error::invalid_value(format_args!(
                "`{}` is not a valid timestamp layout",
                pattern
            )));
        }
        Ok(TimeLayout::Custom(pattern))
    }

    pub fn parse(&self, s: &str) -> Result<DateTime<FixedOffset>> {
        let parsed = match self {
            TimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(s),
            TimeLayout::Rfc2822 => DateTime::parse_from_rfc2822(s),
            TimeLayout::Custom(pattern) => parse_custom(s, pattern),
        };
        parsed.map_err(|e| {
            Error::invalid_value(format_args!(
                "\"{}\" does not match layout {}: {}",
                s, self, e
            ))
        })
    }

    pub fn format(&self, t: &DateTime<FixedOffset>) -> String {
        match self {
            TimeLayout::Rfc3339 => t.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimeLayout::Rfc2822 => {
                if !(0..=9999).contains(&t.year()) {
                    tracing::warn!(year = t.year(), "year out of RFC 2822 range, writing RFC 3339");
                    return TimeLayout::Rfc3339.format(t);
                }
                t.to_rfc2822()
            }
            TimeLayout::Custom(pattern) => {
                let mut out = String::new();
                if write!(out, "{}", t.format(pattern)).is_err() {
                    // only reachable for patterns built without `custom`
                    tracing::warn!(%pattern, "invalid timestamp layout, writing RFC 3339");
                    return TimeLayout::Rfc3339.format(t);
                }
                out
            }
        }
    }
}

fn parse_custom(s: &str, pattern: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    let zoned = DateTime::parse_from_str(s, pattern);
    if zoned.is_ok() {
        return zoned;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
        return Ok(date.and_time(NaiveTime::default()).and_utc().fixed_offset());
    }
    zoned
}

impl core::fmt::Display for TimeLayout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimeLayout::Rfc3339 => f.write_str("RFC 3339"),
            TimeLayout::Rfc2822 => f.write_str("RFC 2822"),
            TimeLayout::Custom(pattern) => write!(f, "`{}`", pattern),
        }
    }
}

/// An ordered, never empty list of timestamp layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeLayouts {
    layouts: Vec<TimeLayout>,
}

impl Default for TimeLayouts {
    fn default() -> Self {
        TimeLayouts {
            layouts: vec![TimeLayout::Rfc3339],
        }
    }
}

static CURRENT: OnceLock<RwLock<TimeLayouts>> = OnceLock::new();

fn current_lock() -> &'static RwLock<TimeLayouts> {
    CURRENT.get_or_init(|| RwLock::new(TimeLayouts::default()))
}

impl TimeLayouts {
    /// Build a list from layouts in preference order. Returns `None` when no
    /// layout is given.
    pub fn new<I>(layouts: I) -> Option<Self>
    where
        I: IntoIterator<Item = TimeLayout>,
    {
        let layouts: Vec<_> = layouts.into_iter().collect();
        if layouts.is_empty() {
            None
        } else {
            Some(TimeLayouts { layouts })
        }
    }

    /// A list holding a single layout.
    pub fn single(layout: TimeLayout) -> Self {
        TimeLayouts {
            layouts: vec![layout],
        }
    }

    /// The first layout, used when encoding and displaying timestamps.
    pub fn primary(&self) -> &TimeLayout {
        // never empty, see `new`
        &self.layouts[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeLayout> {
        self.layouts.iter()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Try every layout in order. Returns the first success, or the error of
    /// the last layout tried.
    pub fn parse(&self, s: &str) -> Result<DateTime<FixedOffset>> {
        let mut last = None;
        for layout in &self.layouts {
            match layout.parse(s) {
                Ok(t) => return Ok(t),
                Err(e) => {
                    tracing::trace!(input = s, %layout, "timestamp layout did not match");
                    last = Some(e);
                }
            }
        }
        Err(last.unwrap_or_else(|| Error::invalid_value("no timestamp layout configured")))
    }

    /// A snapshot of the process-wide default layouts.
    pub fn current() -> TimeLayouts {
        current_lock()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the process-wide default layouts. Meant to be called during
    /// initialization, before any concurrent parsing starts.
    pub fn set_current(layouts: TimeLayouts) {
        tracing::debug!(layouts = ?layouts.layouts, "replacing default timestamp layouts");
        *current_lock()
            .write()
            .unwrap_or_else(PoisonError::into_inner) = layouts;
    }

    /// Restore the process-wide default to RFC 3339 only.
    pub fn reset_current() {
        TimeLayouts::set_current(TimeLayouts::default());
    }
}

impl From<TimeLayout> for TimeLayouts {
    fn from(layout: TimeLayout) -> Self {
        TimeLayouts::single(layout)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rfc3339_roundtrip() {
        let layout = TimeLayout::Rfc3339;
        let t = layout.parse("2021-06-01T12:30:45Z").unwrap();
        assert_eq!(layout.format(&t), "2021-06-01T12:30:45Z");

        let t = layout.parse("2021-06-01T12:30:45.125+02:00").unwrap();
        assert_eq!(layout.format(&t), "2021-06-01T12:30:45.125+02:00");
    }

    #[test]
    fn test_rfc2822_out_of_range_years() {
        let layout = TimeLayout::Rfc2822;
        let t = TimeLayout::Rfc3339.parse("2021-06-01T12:30:45Z").unwrap();
        assert!(layout.format(&t).ends_with("Jun 2021 12:30:45 +0000"));

        let far = NaiveDate::from_ymd_opt(10000, 1, 1)
            .unwrap()
            .and_time(NaiveTime::default())
            .and_utc()
            .fixed_offset();
        assert_eq!(layout.format(&far), "+10000-01-01T00:00:00Z");
        // written with a sign, which RFC 3339 parsing rejects
        assert!(TimeLayout::Rfc3339.parse(&layout.format(&far)).is_err());

        let before = NaiveDate::from_ymd_opt(-1, 1, 1)
            .unwrap()
            .and_time(NaiveTime::default())
            .and_utc()
            .fixed_offset();
        let rendered = layout.format(&before);
        assert!(rendered.starts_with('-') && rendered.ends_with("-01-01T00:00:00Z"), "{}", rendered);
    }

    #[test]
    fn test_custom_layouts() {
        let layout = TimeLayout::custom("%Y-%m-%d %H:%M:%S").unwrap();
        let t = layout.parse("2021-06-01 12:30:45").unwrap();
        assert_eq!(t.offset().local_minus_utc(), 0);
        assert_eq!(layout.format(&t), "2021-06-01 12:30:45");

        let layout = TimeLayout::custom("%Y-%m-%d").unwrap();
        let t = layout.parse("2021-06-01").unwrap();
        assert_eq!(
            TimeLayout::Rfc3339.format(&t),
            "2021-06-01T00:00:00Z"
        );

        let layout = TimeLayout::custom("%Y-%m-%d %H:%M %z").unwrap();
        let t = layout.parse("2021-06-01 12:30 +0100").unwrap();
        assert_eq!(t.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_order() {
        let layouts = TimeLayouts::new([
            TimeLayout::Rfc3339,
            TimeLayout::custom("%Y-%m-%d").unwrap(),
        ])
        .unwrap();
        assert!(layouts.parse("2021-06-01T00:00:00Z").is_ok());
        assert!(layouts.parse("2021-06-01").is_ok());

        let err = layouts.parse("yesterday").unwrap_err();
        assert!(err.is_invalid_value());
        // the last failure is reported
        assert!(err.to_string().contains("%Y-%m-%d"));
    }

    #[test]
    fn test_invalid_custom_layout() {
        assert!(TimeLayout::custom("%Y-%Q").unwrap_err().is_invalid_value());
    }

    #[test]
    fn test_layouts_never_empty() {
        assert!(TimeLayouts::new(Vec::new()).is_none());
        assert_eq!(TimeLayouts::default().primary(), &TimeLayout::Rfc3339);
        assert_eq!(TimeLayouts::default().len(), 1);
    }
}
