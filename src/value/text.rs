use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};
use std::io;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use faststr::FastStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::boolean::parse_bool;
use crate::config::TimeLayouts;
use crate::error::{Error, Result};
use crate::input::Input;
use crate::serde::{deserialize_scalar, number, Number, Scalar};

/// A nullable string.
///
/// Every [`Input`] has a textual form, so setting a `Text` never fails:
/// numbers are written in their shortest form, booleans as `true`/`false`,
/// lists are joined with `,`, timestamps use the primary layout of
/// [`TimeLayouts::current`] and invalid UTF-8 in bytes is replaced.
///
/// An empty `Text` encodes as `null` unless
/// [`Text::encode_nil_as_empty_string`] was called.
///
/// ```
/// use flexscalar::Text;
///
/// let t = Text::new(34.5);
/// assert_eq!(t.get(), Some("34.5"));
///
/// let t = Text::new(vec!["a".to_string(), "b".to_string()]);
/// assert_eq!(t.get(), Some("a,b"));
///
/// let mut t = Text::default();
/// t.encode_nil_as_empty_string();
/// assert_eq!(t.to_json().unwrap(), br#""""#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Text {
    value: Option<FastStr>,
    encode_nil_as_empty: bool,
}

impl Text {
    pub(crate) const NAME: &'static str = "Text";

    /// Build a text from any input. See the type documentation for how
    /// each kind is formatted.
    pub fn new(value: impl Into<Input>) -> Text {
        let mut t = Text::default();
        t.set(value);
        t
    }

    /// Replace the value with the textual form of the input. `Input::Null`
    /// clears the text.
    pub fn set(&mut self, value: impl Into<Input>) {
        self.value = format_input(&value.into());
    }

    pub fn set_str(&mut self, value: impl Into<FastStr>) {
        self.value = Some(value.into());
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = None;
    }

    #[inline]
    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[inline]
    pub fn get_faststr(&self) -> Option<&FastStr> {
        self.value.as_ref()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.value.is_none()
    }

    /// Reports true when the text is absent or `""`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(true, |s| s.is_empty())
    }

    /// The length in bytes, `0` when absent.
    #[inline]
    pub fn len(&self) -> usize {
        self.value.as_ref().map_or(0, |s| s.len())
    }

    /// Encode an absent value as `""` instead of `null`.
    pub fn encode_nil_as_empty_string(&mut self) {
        self.encode_nil_as_empty = true;
    }

    /// Encode an absent value as `null`, the default.
    pub fn encode_nil_as_null(&mut self) {
        self.encode_nil_as_empty = false;
    }

    #[inline]
    pub fn encodes_nil_as_empty_string(&self) -> bool {
        self.encode_nil_as_empty
    }

    fn text(&self) -> &str {
        self.get().unwrap_or_default()
    }

    /// Parse the text as a signed integer. Radix prefixes and `_`
    /// separators are accepted.
    pub fn parse_i64(&self) -> Result<i64> {
        number::parse_i64(self.text()).ok_or_else(|| not_a(self.text(), "signed integer"))
    }

    /// Parse the text as an unsigned integer. Radix prefixes and `_`
    /// separators are accepted.
    pub fn parse_u64(&self) -> Result<u64> {
        number::parse_u64(self.text()).ok_or_else(|| not_a(self.text(), "unsigned integer"))
    }

    pub fn parse_f64(&self) -> Result<f64> {
        number::parse_f64(self.text()).ok_or_else(|| not_a(self.text(), "float"))
    }

    /// Parse the text as a boolean literal. Unlike [`crate::Bool`], empty
    /// text is an error here.
    pub fn parse_bool(&self) -> Result<bool> {
        parse_bool(self.text())?.ok_or_else(|| not_a(self.text(), "boolean"))
    }

    /// Parse the text as a [`Number`]. Empty text yields an empty number.
    pub fn parse_number(&self) -> Result<Number> {
        let mut n = Number::default();
        n.parse(self.text())?;
        Ok(n)
    }

    /// Parse the text as a timestamp, trying the layouts in order.
    pub fn parse_timestamp_with(&self, layouts: &TimeLayouts) -> Result<DateTime<FixedOffset>> {
        layouts.parse(self.text())
    }

    /// Parse the text as a duration such as `1h30m`, `1.5s` or `250ms`.
    /// Negative durations are an error.
    pub fn parse_duration(&self) -> Result<Duration> {
        parse_duration(self.text())
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        self.to_scalar().to_json()
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        self.to_scalar().write(writer)
    }

    /// Replace the value with the one decoded from raw JSON. Only strings and
    /// `null` are accepted; the encoding flag is kept.
    pub fn read_json(&mut self, json: &[u8]) -> Result<()> {
        self.value = None;
        let scalar = Scalar::read(json, Text::NAME)?;
        self.value = Text::from_scalar(scalar).map_err(|e| e.with_context(json, Text::NAME))?;
        Ok(())
    }

    pub fn from_json(json: &[u8]) -> Result<Text> {
        let mut t = Text::default();
        t.read_json(json)?;
        Ok(t)
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        match &self.value {
            Some(s) => Scalar::Str(s.clone()),
            None if self.encode_nil_as_empty => Scalar::Str(FastStr::empty()),
            None => Scalar::Null,
        }
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Option<FastStr>> {
        match scalar {
            Scalar::Null => Ok(None),
            Scalar::Str(s) => Ok(Some(s)),
            _ => Err(Error::type_mismatch(Text::NAME)),
        }
    }
}

#[cold]
fn not_a(s: &str, kind: &str) -> Error {
    Error::invalid_value(format_args!("\"{}\" is not a {}", s, kind))
}

/// Parse a sequence of decimal numbers, each with an optional fraction and a
/// unit suffix: `ns`, `us` (or `µs`), `ms`, `s`, `m` or `h`. A bare `0` is
/// accepted. Fractions finer than a nanosecond are truncated.
pub(crate) fn parse_duration(s: &str) -> Result<Duration> {
    let invalid = || not_a(s, "duration");
    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int, tail) = rest.split_at(int_len);
        let (frac, tail) = match tail.strip_prefix('.') {
            Some(t) => t.split_at(t.bytes().take_while(u8::is_ascii_digit).count()),
            None => ("", tail),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(invalid()),
        };

        let whole: u128 = if int.is_empty() {
            0
        } else {
            int.parse().map_err(|_| invalid())?
        };
        let mut part = whole.checked_mul(scale).ok_or_else(invalid)?;
        let mut place = scale;
        for d in frac.bytes() {
            place /= 10;
            if place == 0 {
                break;
            }
            part += u128::from(d - b'0') * place;
        }
        total = total.checked_add(part).ok_or_else(invalid)?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(Error::invalid_value(format_args!(
            "\"{}\" is a negative duration",
            s
        )));
    }
    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// The textual form of an input. Only `Input::Null` and an empty `Number`
/// have none.
pub(crate) fn format_input(input: &Input) -> Option<FastStr> {
    let s = match input {
        Input::Null => return None,
        Input::Bool(true) => FastStr::from_static_str("true"),
        Input::Bool(false) => FastStr::from_static_str("false"),
        Input::Int(i) => FastStr::new(itoa::Buffer::new().format(*i)),
        Input::Uint(u) => FastStr::new(itoa::Buffer::new().format(*u)),
        Input::Float(f) => FastStr::new(format_float(*f)),
        Input::Float32(f) => FastStr::new(if f.is_finite() {
            ryu::Buffer::new().format_finite(*f).to_owned()
        } else {
            f.to_string()
        }),
        Input::Str(s) => s.clone(),
        Input::Bytes(b) => match simdutf8::basic::from_utf8(b) {
            Ok(s) => FastStr::new(s),
            Err(_) => {
                tracing::debug!(len = b.len(), "replacing invalid UTF-8 in text input");
                FastStr::from_string(String::from_utf8_lossy(b).into_owned())
            }
        },
        Input::List(list) => FastStr::from_string(list.join(",")),
        Input::RawNumber(n) => FastStr::new(n.as_str()),
        Input::Number(n) => {
            if n.is_nil() {
                return None;
            }
            FastStr::from_string(n.to_string())
        }
        Input::Timestamp(t) => {
            FastStr::from_string(TimeLayouts::current().primary().format(t))
        }
    };
    Some(s)
}

fn format_float(f: f64) -> String {
    if f.is_finite() {
        ryu::Buffer::new().format_finite(f).to_owned()
    } else {
        f.to_string()
    }
}

impl PartialEq for Text {
    /// Compares the values only; the encoding flag is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.get() == Some(other)
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.get() == Some(*other)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text {
            value: Some(FastStr::new(s)),
            encode_nil_as_empty: false,
        }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text {
            value: Some(FastStr::from_string(s)),
            encode_nil_as_empty: false,
        }
    }
}

impl From<FastStr> for Text {
    fn from(s: FastStr) -> Self {
        Text {
            value: Some(s),
            encode_nil_as_empty: false,
        }
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_scalar().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Text, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scalar = deserialize_scalar(deserializer, Text::NAME)?;
        let found = scalar.kind_name();
        let value = Text::from_scalar(scalar).map_err(|_| {
            serde::de::Error::custom(format_args!("invalid type: {}, expected a string", found))
        })?;
        Ok(Text {
            value,
            encode_nil_as_empty: false,
        })
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::serde::RawNumber;

    #[test]
    fn test_format_inputs() {
        assert_eq!(Text::new(-12i16), "-12");
        assert_eq!(Text::new(u64::MAX), "18446744073709551615");
        assert_eq!(Text::new(34.34), "34.34");
        assert_eq!(Text::new(1.0), "1.0");
        assert_eq!(Text::new(34.34f32), "34.34");
        assert_eq!(Text::new(true), "true");
        assert_eq!(Text::new(&b"bytes"[..]), "bytes");
        assert_eq!(Text::new(&b"a\xffb"[..]), "a\u{FFFD}b");
        assert_eq!(Text::new(&["x", "y", "z"][..]), "x,y,z");
        assert_eq!(Text::new(RawNumber::new("1e3").unwrap()), "1e3");
        assert_eq!(Text::new(Number::from(7u8)), "7");
        assert!(Text::new(Number::default()).is_nil());
        assert!(Text::new(()).is_nil());
        assert_eq!(Text::new(""), "");
    }

    #[test]
    fn test_format_timestamp() {
        let t = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 1, 12, 0, 0)
            .unwrap();
        assert_eq!(Text::new(t), "2021-06-01T12:00:00+01:00");
    }

    #[test]
    fn test_emptiness() {
        let mut t = Text::default();
        assert!(t.is_nil());
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        t.set("");
        assert!(!t.is_nil());
        assert!(t.is_empty());
        t.set_str("abc");
        assert_eq!(t.len(), 3);
        t.clear();
        assert!(t.is_nil());
    }

    #[test]
    fn test_typed_views() {
        assert_eq!(Text::new("0x10").parse_i64().unwrap(), 16);
        assert_eq!(Text::new("-5").parse_i64().unwrap(), -5);
        assert!(Text::new("-5").parse_u64().unwrap_err().is_invalid_value());
        assert_eq!(Text::new("2.5").parse_f64().unwrap(), 2.5);
        assert!(Text::new("TRUE").parse_bool().unwrap());
        assert!(Text::default().parse_bool().is_err());
        assert_eq!(Text::new("-1").parse_number().unwrap().as_i64(), Some(-1));
        assert!(Text::default().parse_number().unwrap().is_nil());
        let t = Text::new("2021-06-01T12:00:00Z")
            .parse_timestamp_with(&TimeLayouts::default())
            .unwrap();
        assert_eq!(t.timestamp(), 1622548800);
    }

    #[test]
    fn test_parse_duration() {
        let ms = Duration::from_millis;
        assert_eq!(Text::new("300ms").parse_duration().unwrap(), ms(300));
        assert_eq!(Text::new("1h30m").parse_duration().unwrap(), ms(5_400_000));
        assert_eq!(Text::new("1.5s").parse_duration().unwrap(), ms(1500));
        assert_eq!(Text::new(".5m").parse_duration().unwrap(), ms(30_000));
        assert_eq!(Text::new("+2us").parse_duration().unwrap(), Duration::from_micros(2));
        assert_eq!(Text::new("2\u{b5}s").parse_duration().unwrap(), Duration::from_micros(2));
        assert_eq!(Text::new("1.0000000009s").parse_duration().unwrap(), Duration::from_secs(1));
        assert_eq!(Text::new("0").parse_duration().unwrap(), Duration::ZERO);
        assert_eq!(Text::new("-0").parse_duration().unwrap(), Duration::ZERO);

        for s in ["", "1", "s", ".s", "1x", "1h-2m", "-1s", "1.s2", "99999999999999999999999h"] {
            let err = Text::new(s).parse_duration().unwrap_err();
            assert!(err.is_invalid_value(), "{:?}", s);
        }
        assert!(Text::default().parse_duration().is_err());
    }

    #[test]
    fn test_json() {
        let mut t = Text::default();
        assert_eq!(t.to_json().unwrap(), b"null");
        t.encode_nil_as_empty_string();
        assert_eq!(t.to_json().unwrap(), br#""""#);
        t.read_json(br#""a\"b""#).unwrap();
        assert_eq!(t, "a\"b");
        assert_eq!(t.to_json().unwrap(), br#""a\"b""#);
        // the flag survives decoding
        t.read_json(b"null").unwrap();
        assert_eq!(t.to_json().unwrap(), br#""""#);
        t.encode_nil_as_null();
        assert_eq!(t.to_json().unwrap(), b"null");

        for json in [&b"12"[..], b"true", b"{}", b"[\"a\"]", b"\"abc"] {
            let err = Text::from_json(json).unwrap_err();
            assert!(err.is_type_mismatch(), "{:?}", json);
            assert_eq!(err.expected(), Some("Text"));
        }
    }

    #[test]
    fn test_serde() {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Named {
            name: Text,
        }
        let n: Named = serde_json::from_str(r#"{"name":"中文"}"#).unwrap();
        assert_eq!(n.name, "中文");
        assert_eq!(serde_json::to_string(&n).unwrap(), r#"{"name":"中文"}"#);
        let err = serde_json::from_str::<Named>(r#"{"name":3}"#).unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }
}
