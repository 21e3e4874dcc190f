use core::fmt;

use chrono::{DateTime, FixedOffset};
use faststr::FastStr;

use super::{
    empty_scalar, fmt_timestamp, impl_number_accessors, impl_variant, quoted_big_number,
    text_as_number, text_as_timestamp, timestamp_scalar, Kind,
};
use crate::config::{TimeLayout, TimeLayouts};
use crate::error::Result;
use crate::input::Input;
use crate::serde::{Number, Scalar};
use crate::value::{format_input, Timestamp};

/// Either a number, a timestamp or text.
///
/// ```
/// use flexscalar::TextNumberOrTimestamp;
///
/// let mut v = TextNumberOrTimestamp::new("234");
/// assert_eq!(v.as_i64(), Some(234));
///
/// let v = TextNumberOrTimestamp::new("2024-03-01T10:00:00Z");
/// assert!(v.is_timestamp());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextNumberOrTimestamp {
    slot: Slot,
    encode_nil_as_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
enum Slot {
    #[default]
    Empty,
    Text(FastStr),
    Number(Number),
    Timestamp(DateTime<FixedOffset>),
}

impl Slot {
    fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Empty => None,
            Slot::Text(_) => Some(Kind::Text),
            Slot::Number(_) => Some(Kind::Number),
            Slot::Timestamp(_) => Some(Kind::Timestamp),
        }
    }

    fn text(&self) -> Option<&FastStr> {
        match self {
            Slot::Text(s) => Some(s),
            _ => None,
        }
    }

    fn to_input(&self) -> Input {
        match self {
            Slot::Empty => Input::Null,
            Slot::Text(s) => Input::Str(s.clone()),
            Slot::Number(n) => Input::Number(*n),
            Slot::Timestamp(t) => Input::Timestamp(*t),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => Ok(()),
            Slot::Text(s) => f.write_str(s),
            Slot::Number(n) => fmt::Display::fmt(n, f),
            Slot::Timestamp(t) => fmt_timestamp(t, f),
        }
    }
}

impl TextNumberOrTimestamp {
    /// Replace the value, trying the number slot, then the timestamp slot
    /// with the current layouts, then text.
    pub fn set(&mut self, value: impl Into<Input>) {
        self.set_with(value, &TimeLayouts::current());
    }

    /// Like [`TextNumberOrTimestamp::set`], parsing timestamps with the given
    /// layouts.
    pub fn set_with(&mut self, value: impl Into<Input>, layouts: &TimeLayouts) {
        let input = value.into();
        self.slot = Slot::Empty;
        if let Ok(Some(n)) = Number::coerce(&input) {
            self.slot = Slot::Number(n.into());
        } else if let Ok(Some(t)) = Timestamp::coerce(&input, layouts) {
            self.slot = Slot::Timestamp(t);
        } else if let Some(s) = format_input(&input) {
            self.slot = Slot::Text(s);
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.slot, Slot::Number(_))
    }

    #[inline]
    pub fn is_timestamp(&self) -> bool {
        matches!(self.slot, Slot::Timestamp(_))
    }

    /// The number slot. Text that parses as a number is moved to the number
    /// slot first.
    pub fn as_number(&mut self) -> Option<&Number> {
        if let Slot::Text(s) = &self.slot {
            if let Some(n) = text_as_number(s) {
                tracing::trace!(variant = Self::NAME, kind = %Kind::Number, "reinterpreted text");
                self.slot = Slot::Number(n);
            }
        }
        match &self.slot {
            Slot::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn peek_number(&self) -> Option<Number> {
        match &self.slot {
            Slot::Number(n) => Some(*n),
            Slot::Text(s) => text_as_number(s),
            _ => None,
        }
    }

    /// The timestamp slot. Text matching one of the current layouts is moved
    /// to the timestamp slot first.
    pub fn as_timestamp(&mut self) -> Option<DateTime<FixedOffset>> {
        self.as_timestamp_with(&TimeLayouts::current())
    }

    pub fn as_timestamp_with(&mut self, layouts: &TimeLayouts) -> Option<DateTime<FixedOffset>> {
        if let Slot::Text(s) = &self.slot {
            if let Some(t) = text_as_timestamp(s, layouts) {
                tracing::trace!(variant = Self::NAME, kind = %Kind::Timestamp, "reinterpreted text");
                self.slot = Slot::Timestamp(t);
            }
        }
        match self.slot {
            Slot::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn peek_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match &self.slot {
            Slot::Timestamp(t) => Some(*t),
            Slot::Text(s) => text_as_timestamp(s, &TimeLayouts::current()),
            _ => None,
        }
    }

    /// Render a timestamp with `layout`; any other value as `Display` does.
    pub fn format(&self, layout: &TimeLayout) -> String {
        match &self.slot {
            Slot::Timestamp(t) => layout.format(t),
            _ => self.to_string(),
        }
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        match &self.slot {
            Slot::Number(n) => n.to_scalar(),
            Slot::Timestamp(t) => timestamp_scalar(t),
            Slot::Text(s) => Scalar::Str(s.clone()),
            Slot::Empty => empty_scalar(self.encode_nil_as_empty),
        }
    }

    fn slot_from_scalar(scalar: Scalar) -> Result<Slot> {
        Ok(match scalar {
            Scalar::Null => Slot::Empty,
            Scalar::Bool(b) => Slot::Text(FastStr::from_static_str(if b { "true" } else { "false" })),
            Scalar::Str(s) => match quoted_big_number(&s) {
                Some(n) => Slot::Number(n),
                None => Slot::Text(s),
            },
            number => Slot::Number(Number::from_scalar(number)?),
        })
    }
}

impl_variant!(TextNumberOrTimestamp);
impl_number_accessors!(TextNumberOrTimestamp);

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_set_order() {
        let mut v = TextNumberOrTimestamp::new("234");
        assert!(v.is_number());
        assert_eq!(v.as_i64(), Some(234));

        let v = TextNumberOrTimestamp::new("not-a-number");
        assert!(v.is_text());

        let t = Utc.with_ymd_and_hms(2023, 7, 4, 12, 30, 0).unwrap();
        let v = TextNumberOrTimestamp::new(t);
        assert!(v.is_timestamp());
        assert_eq!(v.peek_timestamp(), Some(t.fixed_offset()));

        let v = TextNumberOrTimestamp::new("2023-07-04T12:30:00+02:00");
        assert!(v.is_timestamp());

        let v = TextNumberOrTimestamp::new(false);
        assert_eq!(v.as_text(), Some("false"));
        let v = TextNumberOrTimestamp::new("");
        assert!(v.is_empty_string());
        assert!(!v.is_nil());
    }

    #[test]
    fn test_set_with_layouts() {
        let layouts = TimeLayouts::single(TimeLayout::custom("%d/%m/%Y %H:%M %z").unwrap());
        let mut v = TextNumberOrTimestamp::default();
        v.set_with("04/07/2023 12:30 +0000", &layouts);
        assert!(v.is_timestamp());
        v.set("04/07/2023 12:30 +0000");
        assert!(v.is_text());
        assert_eq!(v.peek_timestamp(), None);
        assert!(v.as_timestamp_with(&layouts).is_some());
        assert!(v.is_timestamp());
    }

    #[test]
    fn test_memoized_timestamp() {
        let mut v = TextNumberOrTimestamp::from_json(br#""2023-07-04T12:30:00Z""#).unwrap();
        assert!(v.is_text());
        assert_eq!(v.as_i64(), None);
        assert!(v.is_text());
        assert!(v.peek_timestamp().is_some());
        assert!(v.is_text());
        let t = v.as_timestamp().unwrap();
        assert!(v.is_timestamp());
        assert_eq!(t, Utc.with_ymd_and_hms(2023, 7, 4, 12, 30, 0).unwrap());
        assert_eq!(v.to_json().unwrap(), br#""2023-07-04T12:30:00Z""#);
        assert_eq!(v.as_text(), None);
    }

    #[test]
    fn test_format() {
        let t = Utc.with_ymd_and_hms(2023, 7, 4, 12, 30, 0).unwrap();
        let layout = TimeLayout::custom("%Y/%m/%d").unwrap();
        assert_eq!(TextNumberOrTimestamp::new(t).format(&layout), "2023/07/04");
        assert_eq!(TextNumberOrTimestamp::new(12).format(&layout), "12");
        assert_eq!(TextNumberOrTimestamp::new("x").format(&layout), "x");
        assert_eq!(TextNumberOrTimestamp::new(t).to_string(), "2023-07-04T12:30:00Z");
    }

    #[test]
    fn test_decode_shapes() {
        assert!(TextNumberOrTimestamp::from_json(b"-3.25").unwrap().is_number());
        assert_eq!(
            TextNumberOrTimestamp::from_json(b"true").unwrap().as_text(),
            Some("true")
        );
        assert!(TextNumberOrTimestamp::from_json(b"null").unwrap().is_nil());
        let big = TextNumberOrTimestamp::from_json(br#""-9007199254740993""#).unwrap();
        assert!(big.is_number());
        let err = TextNumberOrTimestamp::from_json(br#"{"a":1}"#).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.expected(), Some("TextNumberOrTimestamp"));
    }
}
