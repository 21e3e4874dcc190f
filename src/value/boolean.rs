use core::fmt::{self, Display};
use std::io;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::input::Input;
use crate::serde::{deserialize_scalar, Scalar};

/// A nullable boolean.
///
/// Text parses case-insensitively from `true` and `false`, and from `1` and
/// `0`. An empty string clears the box instead of failing.
///
/// ```
/// use flexscalar::Bool;
///
/// let b = Bool::new("TRUE").unwrap();
/// assert!(b.is_true());
///
/// let b = Bool::new("").unwrap();
/// assert!(b.is_nil());
///
/// assert!(Bool::new("yes").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bool {
    value: Option<bool>,
}

impl Bool {
    pub(crate) const NAME: &'static str = "Bool";

    pub const TRUE: Bool = Bool { value: Some(true) };
    pub const FALSE: Bool = Bool { value: Some(false) };

    /// Build a box from a boolean, a string or bytes holding one, another
    /// `Bool`, or null.
    pub fn new(value: impl Into<Input>) -> Result<Bool> {
        let mut b = Bool::default();
        b.set(value)?;
        Ok(b)
    }

    /// Replace the value. Numbers, lists and timestamps are `InvalidType`;
    /// text that is not a boolean literal is `InvalidValue`. The box is
    /// empty after a failed `set`.
    pub fn set(&mut self, value: impl Into<Input>) -> Result<()> {
        self.value = None;
        self.value = Bool::coerce(&value.into())?;
        Ok(())
    }

    pub(crate) fn coerce(input: &Input) -> Result<Option<bool>> {
        match input {
            Input::Null => Ok(None),
            Input::Bool(b) => Ok(Some(*b)),
            Input::Str(s) => parse_bool(s),
            Input::Bytes(b) => match simdutf8::basic::from_utf8(b) {
                Ok(s) => parse_bool(s),
                Err(_) => Err(Error::invalid_value("bytes are not valid UTF-8")),
            },
            _ => Err(Error::invalid_type(input.kind_name(), "a boolean")),
        }
    }

    /// Parse a boolean literal into the box. An empty string clears it.
    pub fn parse(&mut self, s: &str) -> Result<()> {
        self.value = None;
        self.value = parse_bool(s)?;
        Ok(())
    }

    #[inline]
    pub fn set_value(&mut self, value: bool) {
        self.value = Some(value);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = None;
    }

    #[inline]
    pub fn get(&self) -> Option<bool> {
        self.value
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.value.is_none()
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Reports true only when the box holds `true`.
    #[inline]
    pub fn is_true(&self) -> bool {
        self.value == Some(true)
    }

    /// Reports true only when the box holds `false`. An empty box is neither
    /// true nor false.
    #[inline]
    pub fn is_false(&self) -> bool {
        self.value == Some(false)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        self.to_scalar().to_json()
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        self.to_scalar().write(writer)
    }

    /// Replace the value with the one decoded from raw JSON: a boolean
    /// literal, a string holding one, or `null`.
    pub fn read_json(&mut self, json: &[u8]) -> Result<()> {
        self.value = None;
        let scalar = Scalar::read(json, Bool::NAME)?;
        *self = Bool::from_scalar(scalar).map_err(|e| e.with_context(json, Bool::NAME))?;
        Ok(())
    }

    pub fn from_json(json: &[u8]) -> Result<Bool> {
        let mut b = Bool::default();
        b.read_json(json)?;
        Ok(b)
    }

    pub(crate) fn to_scalar(self) -> Scalar {
        self.value.map_or(Scalar::Null, Scalar::Bool)
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Bool> {
        let value = match scalar {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b),
            Scalar::Str(s) => parse_bool(&s)?,
            Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_) => {
                return Err(Error::type_mismatch(Bool::NAME))
            }
        };
        Ok(Bool { value })
    }
}

/// Parse `true`/`false` in any case, or `1`/`0`. Empty text is absent.
pub(crate) fn parse_bool(s: &str) -> Result<Option<bool>> {
    if s.is_empty() {
        Ok(None)
    } else if s == "1" || s.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if s == "0" || s.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(Error::invalid_value(format_args!(
            "\"{}\" is not a boolean",
            s
        )))
    }
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        Bool { value: Some(value) }
    }
}

impl From<Option<bool>> for Bool {
    fn from(value: Option<bool>) -> Self {
        Bool { value }
    }
}

impl PartialEq<bool> for Bool {
    fn eq(&self, other: &bool) -> bool {
        self.value == Some(*other)
    }
}

impl PartialEq<&str> for Bool {
    /// Compares against the `true`/`false` literal, ignoring case.
    fn eq(&self, other: &&str) -> bool {
        match self.value {
            Some(true) => other.eq_ignore_ascii_case("true"),
            Some(false) => other.eq_ignore_ascii_case("false"),
            None => false,
        }
    }
}

impl Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(true) => f.write_str("true"),
            Some(false) => f.write_str("false"),
            None => Ok(()),
        }
    }
}

impl Serialize for Bool {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_scalar().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bool {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scalar = deserialize_scalar(deserializer, Bool::NAME)?;
        Bool::from_scalar(scalar).map_err(serde::de::Error::custom)
    }
}
