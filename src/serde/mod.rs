//! Serde between JSON scalars and the flexible types.
//!
//! Every type in this crate speaks JSON through a single intermediate,
//! [`Scalar`]: raw bytes are sniffed into a `Scalar` by [`Scalar::read`],
//! serde deserializers produce one through [`deserialize_scalar`], and
//! encoding goes the other way through [`Scalar::write`] or
//! `Scalar::serialize`.

pub(crate) mod number;
pub(crate) mod rawnumber;

use std::fmt;
use std::io;

use ::serde::de::{self, Deserializer, Visitor};
use ::serde::{Serialize, Serializer};
use faststr::FastStr;

pub use self::{
    number::{Number, NumberValue, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER},
    rawnumber::RawNumber,
};
use crate::error::{Error, Result};
use crate::format::{CompactFormatter, Formatter};
use crate::raw::{JsonType, RawJson};

/// A single decoded or to-be-encoded JSON scalar.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    /// Always finite.
    Float(f64),
    Str(FastStr),
}

impl Scalar {
    /// Sniff raw JSON and decode it when it is a scalar. Containers and
    /// malformed input are a `TypeMismatch` carrying the raw bytes.
    pub(crate) fn read(json: &[u8], expected: &'static str) -> Result<Scalar> {
        let raw = RawJson::new(json).trimmed();
        let mismatch = || Error::type_mismatch(expected).with_context(json, expected);
        if raw.is_malformed() {
            return Err(mismatch());
        }
        match raw.json_type() {
            Some(JsonType::Null) => Ok(Scalar::Null),
            Some(JsonType::Boolean) => Ok(Scalar::Bool(raw.is_true())),
            Some(JsonType::Number) => {
                let s = core::str::from_utf8(raw.as_bytes()).map_err(|_| mismatch())?;
                Scalar::from_literal(s).ok_or_else(mismatch)
            }
            Some(JsonType::String) => serde_json::from_slice::<FastStr>(raw.as_bytes())
                .map(Scalar::Str)
                .map_err(|_| mismatch()),
            Some(JsonType::Object) | Some(JsonType::Array) | None => Err(mismatch()),
        }
    }

    /// A JSON number literal as the narrowest scalar holding it.
    fn from_literal(s: &str) -> Option<Scalar> {
        if let Ok(u) = s.parse::<u64>() {
            return Some(Scalar::Uint(u));
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(Scalar::Int(i));
        }
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Scalar::Float)
    }

    /// A short name of the JSON shape, used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_) => "number",
            Scalar::Str(_) => "string",
        }
    }

    pub(crate) fn write<W: io::Write>(&self, mut writer: W) -> Result<()> {
        let mut f = CompactFormatter;
        let w = &mut writer;
        let written = match self {
            Scalar::Null => f.write_null(w),
            Scalar::Bool(b) => f.write_bool(w, *b),
            Scalar::Int(i) => f.write_i64(w, *i),
            Scalar::Uint(u) => f.write_u64(w, *u),
            Scalar::Float(v) => f.write_f64(w, *v),
            Scalar::Str(s) => f.write_string(w, s),
        };
        written.map_err(Error::io)
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(16);
        self.write(&mut buf)?;
        Ok(buf)
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Uint(u) => serializer.serialize_u64(*u),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

struct ScalarVisitor {
    expected: &'static str,
}

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a JSON scalar for {}", self.expected)
    }

    #[inline]
    fn visit_bool<E>(self, v: bool) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Bool(v))
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Int(v))
    }

    #[inline]
    fn visit_u64<E>(self, v: u64) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Uint(v))
    }

    #[inline]
    fn visit_f64<E>(self, v: f64) -> core::result::Result<Scalar, E>
    where
        E: de::Error,
    {
        if v.is_finite() {
            Ok(Scalar::Float(v))
        } else {
            Err(E::custom(format_args!("{} is not a JSON number", v)))
        }
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Str(FastStr::new(v)))
    }

    #[inline]
    fn visit_string<E>(self, v: String) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Str(FastStr::from_string(v)))
    }

    #[inline]
    fn visit_unit<E>(self) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Null)
    }

    #[inline]
    fn visit_none<E>(self) -> core::result::Result<Scalar, E> {
        Ok(Scalar::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> core::result::Result<Scalar, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

/// Drive a serde deserializer into a [`Scalar`]. Maps and sequences are
/// rejected with the deserializer's own type error.
pub(crate) fn deserialize_scalar<'de, D>(
    deserializer: D,
    expected: &'static str,
) -> core::result::Result<Scalar, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarVisitor { expected })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_scalars() {
        assert_eq!(Scalar::read(b"null", "T").unwrap(), Scalar::Null);
        assert_eq!(Scalar::read(b" true ", "T").unwrap(), Scalar::Bool(true));
        assert_eq!(Scalar::read(b"false", "T").unwrap(), Scalar::Bool(false));
        assert_eq!(Scalar::read(b"12", "T").unwrap(), Scalar::Uint(12));
        assert_eq!(Scalar::read(b"-12", "T").unwrap(), Scalar::Int(-12));
        assert_eq!(Scalar::read(b"1.5", "T").unwrap(), Scalar::Float(1.5));
        assert_eq!(
            Scalar::read(br#""a\nb""#, "T").unwrap(),
            Scalar::Str("a\nb".into())
        );
    }

    #[test]
    fn test_read_rejects() {
        for json in [&b"{}"[..], b"[]", b"", b"nul", b"\"abc", b"[1,2", b"1e999"] {
            let err = Scalar::read(json, "Text").unwrap_err();
            assert!(err.is_type_mismatch(), "{:?}", json);
            assert_eq!(err.expected(), Some("Text"));
        }
    }

    #[test]
    fn test_write() {
        assert_eq!(Scalar::Null.to_json().unwrap(), b"null");
        assert_eq!(Scalar::Str("a\"".into()).to_json().unwrap(), br#""a\"""#);
        assert_eq!(Scalar::Float(0.5).to_json().unwrap(), b"0.5");
        assert_eq!(Scalar::Int(-1).to_json().unwrap(), b"-1");
    }

    #[test]
    fn test_serde_visitor() {
        let mut de = serde_json::Deserializer::from_str("\"x\"");
        assert_eq!(
            deserialize_scalar(&mut de, "T").unwrap(),
            Scalar::Str("x".into())
        );
        let mut de = serde_json::Deserializer::from_str("[1]");
        assert!(deserialize_scalar(&mut de, "T").is_err());
        assert_eq!(serde_json::to_string(&Scalar::Uint(3)).unwrap(), "3");
    }
}
