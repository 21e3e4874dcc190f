use ::serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use ::std::fmt;
use faststr::FastStr;

use super::number::Number;
use crate::error::{Error, Result};
use crate::raw::RawJson;

/// Represents a JSON number literal by its text, like Golang `json.Number`.
///
/// The text is validated once on construction and kept as written, so that
/// precision is never lost before the literal is converted.
///
/// ```
/// use flexscalar::{Number, RawNumber};
///
/// let raw = RawNumber::new("18446744073709551615").unwrap();
/// assert_eq!(raw.as_str(), "18446744073709551615");
///
/// let n = Number::try_from(raw).unwrap();
/// assert_eq!(n.as_u64(), Some(u64::MAX));
///
/// assert!(RawNumber::new("0x10").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RawNumber {
    n: FastStr,
}

impl RawNumber {
    /// Wrap a JSON number literal. Fails with `InvalidValue` if the text is
    /// not a finite JSON number.
    pub fn new(s: &str) -> Result<Self> {
        RawNumber::from_faststr(FastStr::new(s))
    }

    pub(crate) fn from_faststr(n: FastStr) -> Result<Self> {
        let raw = RawJson::from_str(&n);
        if !raw.is_number() || raw.is_malformed() {
            return Err(Error::invalid_value(format_args!(
                "\"{}\" is not a JSON number",
                n
            )));
        }
        Ok(Self { n })
    }

    /// as_str returns the underlying string representation of the number.
    pub fn as_str(&self) -> &str {
        self.n.as_str()
    }

    /// If the literal is an integer, represent it as i64 if possible.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        self.n.parse().ok()
    }

    /// If the literal is an integer, represent it as u64 if possible.
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        self.n.parse().ok()
    }

    /// Represents the literal as finite f64. Always succeeds for a validated
    /// literal, possibly rounding.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        self.n.parse::<f64>().ok().filter(|float| float.is_finite())
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.n)
    }
}

impl<'de> Deserialize<'de> for RawNumber {
    #[inline]
    fn deserialize<D>(deserializer: D) -> core::result::Result<RawNumber, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawNumberVisitor;

        impl<'de> Visitor<'de> for RawNumberVisitor {
            type Value = RawNumber;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON number or a string holding one")
            }

            fn visit_i64<E>(self, v: i64) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                RawNumber::new(itoa::Buffer::new().format(v)).map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                RawNumber::new(itoa::Buffer::new().format(v)).map_err(E::custom)
            }

            fn visit_f64<E>(self, v: f64) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                if !v.is_finite() {
                    return Err(E::custom(format_args!("{} is not a JSON number", v)));
                }
                RawNumber::new(ryu::Buffer::new().format_finite(v)).map_err(E::custom)
            }

            fn visit_str<E>(self, v: &str) -> core::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                RawNumber::new(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RawNumberVisitor)
    }
}

impl Serialize for RawNumber {
    /// Integers are written exactly. Other literals are written through their
    /// nearest `f64`.
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(u) = self.as_u64() {
            serializer.serialize_u64(u)
        } else if let Some(i) = self.as_i64() {
            serializer.serialize_i64(i)
        } else {
            match self.as_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => Err(::serde::ser::Error::custom("invalid number literal")),
            }
        }
    }
}

impl TryFrom<RawNumber> for Number {
    type Error = Error;

    fn try_from(value: RawNumber) -> Result<Self> {
        Number::new(value)
    }
}
