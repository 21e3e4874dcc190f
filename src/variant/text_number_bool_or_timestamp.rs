use core::fmt;

use chrono::{DateTime, FixedOffset};
use faststr::FastStr;

use super::{
    empty_scalar, fmt_timestamp, impl_number_accessors, impl_variant, quoted_big_number,
    text_as_bool, text_as_number, text_as_timestamp, timestamp_scalar, Kind,
};
use crate::config::{TimeLayout, TimeLayouts};
use crate::error::Result;
use crate::input::Input;
use crate::serde::{Number, Scalar};
use crate::value::{format_input, Bool, Timestamp};

/// Either a number, a timestamp, a boolean or text.
///
/// Booleans on the wire keep their own slot, so `true` and `"true"` decode
/// differently: the first is a bool, the second text until read with
/// [`as_bool`](TextNumberBoolOrTimestamp::as_bool).
#[derive(Debug, Clone, Default)]
pub struct TextNumberBoolOrTimestamp {
    slot: Slot,
    encode_nil_as_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
enum Slot {
    #[default]
    Empty,
    Text(FastStr),
    Number(Number),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
}

impl Slot {
    fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Empty => None,
            Slot::Text(_) => Some(Kind::Text),
            Slot::Number(_) => Some(Kind::Number),
            Slot::Bool(_) => Some(Kind::Bool),
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
            Slot::Bool(b) => Input::Bool(*b),
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
            Slot::Bool(b) => fmt::Display::fmt(b, f),
            Slot::Timestamp(t) => fmt_timestamp(t, f),
        }
    }
}

impl TextNumberBoolOrTimestamp {
    /// Replace the value, trying the number slot, the timestamp slot with the
    /// current layouts and the bool slot, in that order, before text.
    pub fn set(&mut self, value: impl Into<Input>) {
        self.set_with(value, &TimeLayouts::current());
    }

    pub fn set_with(&mut self, value: impl Into<Input>, layouts: &TimeLayouts) {
        let input = value.into();
        self.slot = Slot::Empty;
        if let Ok(Some(n)) = Number::coerce(&input) {
            self.slot = Slot::Number(n.into());
        } else if let Ok(Some(t)) = Timestamp::coerce(&input, layouts) {
            self.slot = Slot::Timestamp(t);
        } else if let Ok(Some(b)) = Bool::coerce(&input) {
            self.slot = Slot::Bool(b);
        } else if let Some(s) = format_input(&input) {
            self.slot = Slot::Text(s);
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.slot, Slot::Number(_))
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self.slot, Slot::Bool(_))
    }

    #[inline]
    pub fn is_timestamp(&self) -> bool {
        matches!(self.slot, Slot::Timestamp(_))
    }

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

    /// The bool slot. Text holding `true`, `false`, `1` or `0` in any case is
    /// moved to the bool slot first.
    pub fn as_bool(&mut self) -> Option<bool> {
        if let Slot::Text(s) = &self.slot {
            if let Some(b) = text_as_bool(s) {
                tracing::trace!(variant = Self::NAME, kind = %Kind::Bool, "reinterpreted text");
                self.slot = Slot::Bool(b);
            }
        }
        match self.slot {
            Slot::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn peek_bool(&self) -> Option<bool> {
        match &self.slot {
            Slot::Bool(b) => Some(*b),
            Slot::Text(s) => text_as_bool(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&mut self) -> Option<DateTime<FixedOffset>> {
        self.as_timestamp_with(&TimeLayouts::current())
    }

    /// The timestamp slot. Text matching one of `layouts` is moved to the
    /// timestamp slot first.
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
            Slot::Bool(b) => Scalar::Bool(*b),
            Slot::Text(s) => Scalar::Str(s.clone()),
            Slot::Empty => empty_scalar(self.encode_nil_as_empty),
        }
    }

    fn slot_from_scalar(scalar: Scalar) -> Result<Slot> {
        Ok(match scalar {
            Scalar::Null => Slot::Empty,
            Scalar::Bool(b) => Slot::Bool(b),
            Scalar::Str(s) => match quoted_big_number(&s) {
                Some(n) => Slot::Number(n),
                None => Slot::Text(s),
            },
            number => Slot::Number(Number::from_scalar(number)?),
        })
    }
}

impl_variant!(TextNumberBoolOrTimestamp);
impl_number_accessors!(TextNumberBoolOrTimestamp);
