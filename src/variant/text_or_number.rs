use core::fmt;
use std::time::Duration;

use faststr::FastStr;

use super::{
    empty_scalar, impl_number_accessors, impl_variant, quoted_big_number, text_as_number, Kind,
};
use crate::error::Result;
use crate::input::Input;
use crate::serde::{Number, Scalar};
use crate::value::{format_input, parse_duration};

/// Either a number or text.
///
/// `set` keeps numbers, and text that parses as one, in the number slot.
/// Everything else is kept as text.
///
/// ```
/// use flexscalar::{Kind, TextOrNumber};
///
/// let mut v = TextOrNumber::from_json(br#""42""#).unwrap();
/// assert_eq!(v.kind(), Some(Kind::Text));
/// assert_eq!(v.as_i64(), Some(42));
/// assert_eq!(v.kind(), Some(Kind::Number));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextOrNumber {
    slot: Slot,
    encode_nil_as_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
enum Slot {
    #[default]
    Empty,
    Text(FastStr),
    Number(Number),
}

impl Slot {
    fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Empty => None,
            Slot::Text(_) => Some(Kind::Text),
            Slot::Number(_) => Some(Kind::Number),
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
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => Ok(()),
            Slot::Text(s) => f.write_str(s),
            Slot::Number(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl TextOrNumber {
    /// Replace the value. The input goes to the number slot if it is or
    /// parses as a number, else to the text slot. Only null leaves the
    /// variant empty.
    pub fn set(&mut self, value: impl Into<Input>) {
        let input = value.into();
        self.slot = Slot::Empty;
        if let Ok(Some(n)) = Number::coerce(&input) {
            self.slot = Slot::Number(n.into());
        } else if let Some(s) = format_input(&input) {
            self.slot = Slot::Text(s);
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.slot, Slot::Number(_))
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

    /// Like [`TextOrNumber::as_number`], without moving text.
    pub fn peek_number(&self) -> Option<Number> {
        match &self.slot {
            Slot::Number(n) => Some(*n),
            Slot::Text(s) => text_as_number(s),
            Slot::Empty => None,
        }
    }

    /// The text slot read as a duration such as `1h30m` or `250ms`. Numbers
    /// are not durations, and the text stays in place.
    pub fn as_duration(&self) -> Option<Duration> {
        self.slot.text().and_then(|s| parse_duration(s).ok())
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        match &self.slot {
            Slot::Number(n) => n.to_scalar(),
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

impl_variant!(TextOrNumber);
impl_number_accessors!(TextOrNumber);

#[cfg(test)]
mod test {
    use super::*;
    use crate::serde::NumberValue;

    #[test]
    fn test_set_order() {
        let v = TextOrNumber::new("234");
        assert!(v.is_number());
        assert_eq!(v.peek_number().and_then(|n| n.as_i64()), Some(234));

        let v = TextOrNumber::new(-7i8);
        assert_eq!(v.peek_number().and_then(|n| n.value()), Some(NumberValue::Int(-7)));

        let v = TextOrNumber::new("not a number");
        assert!(v.is_text());
        assert_eq!(v.as_text(), Some("not a number"));

        let v = TextOrNumber::new(true);
        assert_eq!(v.as_text(), Some("true"));

        let v = TextOrNumber::new("");
        assert!(v.is_text());
        assert!(v.is_empty_string());
        assert!(!v.is_nil());

        let v = TextOrNumber::new(());
        assert!(v.is_nil());
        assert!(v.is_empty_string());
        assert_eq!(v.kind(), None);
    }

    #[test]
    fn test_reset_on_set() {
        let mut v = TextOrNumber::new(5);
        v.set("five");
        assert!(!v.is_number());
        assert!(v.is_text());
        v.set(());
        assert!(v.is_nil());
    }

    #[test]
    fn test_memoized_number() {
        let mut v = TextOrNumber::from_json(br#""0x10""#).unwrap();
        assert!(v.is_text());
        assert_eq!(v.peek_number().and_then(|n| n.as_u64()), Some(16));
        // peeking leaves the text in place
        assert!(v.is_text());

        assert_eq!(v.as_u8(), Some(16));
        assert!(v.is_number());
        assert_eq!(v.as_text(), None);
        assert_eq!(v.to_json().unwrap(), b"16");

        let mut v = TextOrNumber::from_json(br#""abc""#).unwrap();
        assert_eq!(v.as_i64(), None);
        assert!(v.is_text());
    }

    #[test]
    fn test_narrow_accessors() {
        let mut v = TextOrNumber::new(300);
        assert_eq!(v.as_u8(), None);
        assert_eq!(v.as_u16(), Some(300));
        assert_eq!(v.as_f64(), Some(300.0));
        let mut v = TextOrNumber::new(1.5);
        assert_eq!(v.as_i64(), None);
        assert_eq!(v.as_f32(), Some(1.5));
    }

    #[test]
    fn test_duration() {
        let v = TextOrNumber::from_json(br#""1m30s""#).unwrap();
        assert_eq!(v.as_duration(), Some(Duration::from_secs(90)));
        assert!(v.is_text());
        assert_eq!(TextOrNumber::new(90).as_duration(), None);
        assert_eq!(TextOrNumber::new("soon").as_duration(), None);
        assert_eq!(TextOrNumber::default().as_duration(), None);
    }

    #[test]
    fn test_decode_shapes() {
        let v = TextOrNumber::from_json(b"12").unwrap();
        assert!(v.is_number());
        let v = TextOrNumber::from_json(br#""12""#).unwrap();
        assert!(v.is_text());
        let v = TextOrNumber::from_json(b"true").unwrap();
        assert_eq!(v.as_text(), Some("true"));
        assert!(TextOrNumber::from_json(b"null").unwrap().is_nil());

        for json in [&b"{}"[..], b"[1]", b"\"open", b"1.2.3"] {
            let err = TextOrNumber::from_json(json).unwrap_err();
            assert!(err.is_type_mismatch(), "{:?}", json);
            assert_eq!(err.expected(), Some("TextOrNumber"));
        }
    }

    #[test]
    fn test_big_numbers_roundtrip() {
        let v = TextOrNumber::new(u64::MAX);
        let json = v.to_json().unwrap();
        assert_eq!(json, br#""18446744073709551615""#);
        let mut back = TextOrNumber::from_json(&json).unwrap();
        assert!(back.is_number());
        assert_eq!(back.as_u64(), Some(u64::MAX));
        assert_eq!(back.to_json().unwrap(), json);

        // not what the encoder writes, so it stays text
        let v = TextOrNumber::from_json(br#""018446744073709551615""#).unwrap();
        assert!(v.is_text());
        let v = TextOrNumber::from_json(br#""12""#).unwrap();
        assert!(v.is_text());
    }

    #[test]
    fn test_empty_encoding() {
        let mut v = TextOrNumber::default();
        assert_eq!(v.to_json().unwrap(), b"null");
        v.encode_nil_as_empty_string();
        assert_eq!(v.to_json().unwrap(), br#""""#);
        v.read_json(b"null").unwrap();
        assert_eq!(v.to_json().unwrap(), br#""""#);
        v.encode_nil_as_null();
        assert_eq!(v.to_json().unwrap(), b"null");
    }

    #[test]
    fn test_display_and_eq() {
        assert_eq!(TextOrNumber::new(2.5).to_string(), "2.5");
        assert_eq!(TextOrNumber::new("x").to_string(), "x");
        assert_eq!(TextOrNumber::default().to_string(), "");

        // signed input and parsed text hold 5 differently
        assert_eq!(TextOrNumber::new(5), TextOrNumber::new("5"));
        assert_eq!(TextOrNumber::new(5i64), TextOrNumber::from_json(b"5").unwrap());
        assert_ne!(TextOrNumber::new(-5), TextOrNumber::new("5"));

        let mut a = TextOrNumber::new(1);
        a.encode_nil_as_empty_string();
        assert_eq!(a, TextOrNumber::new("1"));
        assert_ne!(a, TextOrNumber::new("one"));
    }
}
