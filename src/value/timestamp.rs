use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};
use std::io;

use chrono::{DateTime, FixedOffset};
use faststr::FastStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{TimeLayout, TimeLayouts};
use crate::error::{Error, Result};
use crate::input::Input;
use crate::serde::{deserialize_scalar, Scalar};

/// A nullable point in time with a fixed UTC offset.
///
/// Text is parsed against an ordered list of [`TimeLayouts`], either given
/// explicitly (the `*_with` methods) or the process-wide
/// [`TimeLayouts::current`]. Encoding uses the instance layout set by
/// [`Timestamp::set_format`], else the primary current layout.
///
/// ```
/// use flexscalar::{TimeLayout, Timestamp};
///
/// let mut t = Timestamp::new("2021-06-01T12:30:00+02:00").unwrap();
/// assert_eq!(t.to_json().unwrap(), br#""2021-06-01T12:30:00+02:00""#);
///
/// t.set_format(TimeLayout::custom("%Y-%m-%d").unwrap());
/// assert_eq!(t.to_json().unwrap(), br#""2021-06-01""#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timestamp {
    value: Option<DateTime<FixedOffset>>,
    format: Option<TimeLayout>,
}

impl Timestamp {
    pub(crate) const NAME: &'static str = "Timestamp";

    /// Build a timestamp from a date-time, a string or bytes holding one,
    /// another `Timestamp`, or null. Text is parsed with the current layouts.
    pub fn new(value: impl Into<Input>) -> Result<Timestamp> {
        let mut t = Timestamp::default();
        t.set(value)?;
        Ok(t)
    }

    /// Replace the value, parsing text with the current layouts. Numbers,
    /// booleans and lists are `InvalidType`; text matching no layout is
    /// `InvalidValue`. The timestamp is empty after a failed `set`.
    pub fn set(&mut self, value: impl Into<Input>) -> Result<()> {
        self.set_with(value, &TimeLayouts::current())
    }

    /// Like [`Timestamp::set`], parsing text with the given layouts.
    pub fn set_with(&mut self, value: impl Into<Input>, layouts: &TimeLayouts) -> Result<()> {
        self.value = None;
        self.value = Timestamp::coerce(&value.into(), layouts)?;
        Ok(())
    }

    pub(crate) fn coerce(
        input: &Input,
        layouts: &TimeLayouts,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        match input {
            Input::Null => Ok(None),
            Input::Timestamp(t) => Ok(Some(*t)),
            Input::Str(s) => layouts.parse(s).map(Some),
            Input::Bytes(b) => match simdutf8::basic::from_utf8(b) {
                Ok(s) => layouts.parse(s).map(Some),
                Err(_) => Err(Error::invalid_value("bytes are not valid UTF-8")),
            },
            _ => Err(Error::invalid_type(input.kind_name(), "a timestamp")),
        }
    }

    /// Parse text with the current layouts.
    pub fn parse(&mut self, s: &str) -> Result<()> {
        self.parse_with(s, &TimeLayouts::current())
    }

    /// Parse text with the given layouts, returning the first match or the
    /// error of the last layout tried.
    pub fn parse_with(&mut self, s: &str, layouts: &TimeLayouts) -> Result<()> {
        self.value = None;
        self.value = Some(layouts.parse(s)?);
        Ok(())
    }

    /// Encode and display this instance with `layout` instead of the
    /// current primary layout.
    pub fn set_format(&mut self, layout: TimeLayout) {
        self.format = Some(layout);
    }

    /// Go back to encoding with the current primary layout.
    pub fn clear_format(&mut self) {
        self.format = None;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = None;
    }

    #[inline]
    pub fn get(&self) -> Option<DateTime<FixedOffset>> {
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

    /// Render the value with a layout, `None` when absent.
    pub fn format(&self, layout: &TimeLayout) -> Option<String> {
        self.value.as_ref().map(|t| layout.format(t))
    }

    fn rendered(&self) -> Option<String> {
        match &self.format {
            Some(layout) => self.format(layout),
            None => self.format(TimeLayouts::current().primary()),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        self.to_scalar().to_json()
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        self.to_scalar().write(writer)
    }

    /// Replace the value with the one decoded from raw JSON, parsing strings
    /// with the current layouts. The instance layout is kept.
    pub fn read_json(&mut self, json: &[u8]) -> Result<()> {
        self.read_json_with(json, &TimeLayouts::current())
    }

    /// Like [`Timestamp::read_json`], parsing strings with the given layouts.
    pub fn read_json_with(&mut self, json: &[u8], layouts: &TimeLayouts) -> Result<()> {
        self.value = None;
        let scalar = Scalar::read(json, Timestamp::NAME)?;
        self.value = Timestamp::from_scalar(scalar, layouts)
            .map_err(|e| e.with_context(json, Timestamp::NAME))?;
        Ok(())
    }

    pub fn from_json(json: &[u8]) -> Result<Timestamp> {
        let mut t = Timestamp::default();
        t.read_json(json)?;
        Ok(t)
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        self.rendered()
            .map_or(Scalar::Null, |s| Scalar::Str(FastStr::from_string(s)))
    }

    pub(crate) fn from_scalar(
        scalar: Scalar,
        layouts: &TimeLayouts,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        match scalar {
            Scalar::Null => Ok(None),
            Scalar::Str(s) => layouts.parse(&s).map(Some),
            _ => Err(Error::type_mismatch(Timestamp::NAME)),
        }
    }
}

impl PartialEq for Timestamp {
    /// Compares the instants only; the instance layout is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(t: DateTime<Tz>) -> Self {
        Timestamp {
            value: Some(t.fixed_offset()),
            format: None,
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rendered() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_scalar().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scalar = deserialize_scalar(deserializer, Timestamp::NAME)?;
        let value = Timestamp::from_scalar(scalar, &TimeLayouts::current())
            .map_err(serde::de::Error::custom)?;
        Ok(Timestamp {
            value,
            format: None,
        })
    }
}
