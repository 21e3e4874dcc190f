use core::fmt;

use faststr::FastStr;

use super::{empty_scalar, impl_variant, text_as_bool, Kind};
use crate::error::{Error, Result};
use crate::input::Input;
use crate::serde::Scalar;
use crate::value::{format_input, Bool};

/// Either a boolean or text.
///
/// ```
/// use flexscalar::BoolOrText;
///
/// let mut v = BoolOrText::new("TRUE");
/// assert_eq!(v.as_bool(), Some(true));
///
/// let mut v = BoolOrText::new("sometimes");
/// assert_eq!(v.as_bool(), None);
/// assert_eq!(v.as_text(), Some("sometimes"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoolOrText {
    slot: Slot,
    encode_nil_as_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
enum Slot {
    #[default]
    Empty,
    Bool(bool),
    Text(FastStr),
}

impl Slot {
    fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Empty => None,
            Slot::Bool(_) => Some(Kind::Bool),
            Slot::Text(_) => Some(Kind::Text),
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
            Slot::Bool(b) => Input::Bool(*b),
            Slot::Text(s) => Input::Str(s.clone()),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => Ok(()),
            Slot::Bool(b) => fmt::Display::fmt(b, f),
            Slot::Text(s) => f.write_str(s),
        }
    }
}

impl BoolOrText {
    /// Replace the value. Booleans and boolean literals go to the bool slot,
    /// anything else to the text slot.
    pub fn set(&mut self, value: impl Into<Input>) {
        let input = value.into();
        self.slot = Slot::Empty;
        if let Ok(Some(b)) = Bool::coerce(&input) {
            self.slot = Slot::Bool(b);
        } else if let Some(s) = format_input(&input) {
            self.slot = Slot::Text(s);
        }
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self.slot, Slot::Bool(_))
    }

    /// The bool slot. Text holding a boolean literal is moved to the bool
    /// slot first.
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

    /// Like [`BoolOrText::as_bool`], without moving text.
    pub fn peek_bool(&self) -> Option<bool> {
        match &self.slot {
            Slot::Bool(b) => Some(*b),
            Slot::Text(s) => text_as_bool(s),
            Slot::Empty => None,
        }
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        match &self.slot {
            Slot::Bool(b) => Scalar::Bool(*b),
            Slot::Text(s) => Scalar::Str(s.clone()),
            Slot::Empty => empty_scalar(self.encode_nil_as_empty),
        }
    }

    fn slot_from_scalar(scalar: Scalar) -> Result<Slot> {
        match scalar {
            Scalar::Null => Ok(Slot::Empty),
            Scalar::Bool(b) => Ok(Slot::Bool(b)),
            Scalar::Str(s) => Ok(Slot::Text(s)),
            Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_) => {
                Err(Error::type_mismatch(Self::NAME))
            }
        }
    }
}

impl_variant!(BoolOrText);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_order() {
        let v = BoolOrText::new(false);
        assert!(v.is_bool());
        let v = BoolOrText::new("0");
        assert_eq!(v.peek_bool(), Some(false));
        assert!(v.is_bool());
        let v = BoolOrText::new("nope");
        assert!(v.is_text());
        let v = BoolOrText::new(3);
        assert_eq!(v.as_text(), Some("3"));
        let v = BoolOrText::new("");
        assert!(v.is_text());
        assert!(v.is_empty_string());
        assert!(BoolOrText::new(()).is_nil());
    }

    #[test]
    fn test_memoized_bool() {
        let mut v = BoolOrText::from_json(br#""False""#).unwrap();
        assert!(v.is_text());
        assert_eq!(v.peek_bool(), Some(false));
        assert!(v.is_text());
        assert_eq!(v.as_bool(), Some(false));
        assert!(v.is_bool());
        assert_eq!(v.to_json().unwrap(), b"false");

        let mut v = BoolOrText::from_json(br#""maybe""#).unwrap();
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.kind(), Some(Kind::Text));
    }

    #[test]
    fn test_decode_shapes() {
        assert!(BoolOrText::from_json(b"true").unwrap().is_bool());
        assert!(BoolOrText::from_json(b"null").unwrap().is_nil());
        let err = BoolOrText::from_json(b"1").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.raw(), Some("1"));
        assert_eq!(err.expected(), Some("BoolOrText"));
        assert!(BoolOrText::from_json(b"[true]").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Opt {
            #[serde(default)]
            v: BoolOrText,
        }
        let o: Opt = serde_json::from_str(r#"{"v":"auto"}"#).unwrap();
        assert_eq!(o.v.as_text(), Some("auto"));
        let o: Opt = serde_json::from_str(r#"{}"#).unwrap();
        assert!(o.v.is_nil());
        assert_eq!(serde_json::to_string(&o).unwrap(), r#"{"v":null}"#);
        assert!(serde_json::from_str::<Opt>(r#"{"v":2}"#).is_err());
    }
}
