//! Classify a single raw JSON value from its leading (and trailing) bytes
//! without parsing it.

use core::fmt::{self, Debug, Display};

use ref_cast::RefCast;
use serde::de::IgnoredAny;

/// The shape of a JSON value, as seen from its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
}

/// A borrowed view over bytes believed to hold exactly one JSON value.
///
/// Every predicate is side effect free and never panics. Classification only
/// looks at the first byte (and the last one for containers and strings), so
/// a `true` answer from `is_number` or `is_object` does not imply that the
/// value is well formed. Use [`RawJson::is_malformed`] for that.
///
/// ```
/// use flexscalar::RawJson;
///
/// let raw = RawJson::from_str("[1,2");
/// assert!(raw.is_array());
/// assert!(raw.is_malformed());
/// ```
#[derive(RefCast, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawJson {
    json: [u8],
}

const TRUE: &[u8] = b"true";
const FALSE: &[u8] = b"false";
const NULL: &[u8] = b"null";

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

impl RawJson {
    /// Wrap raw bytes without copying them.
    #[inline]
    pub fn new(json: &[u8]) -> &Self {
        RawJson::ref_cast(json)
    }

    /// Wrap a string without copying it.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> &Self {
        RawJson::ref_cast(json.as_bytes())
    }

    /// The underlying bytes, untrimmed.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.json
    }

    /// The same value with leading and trailing JSON whitespace removed.
    pub fn trimmed(&self) -> &RawJson {
        let bytes = &self.json;
        let start = bytes
            .iter()
            .position(|b| !is_whitespace(*b))
            .unwrap_or(bytes.len());
        let end = bytes
            .iter()
            .rposition(|b| !is_whitespace(*b))
            .map_or(start, |i| i + 1);
        RawJson::new(&bytes[start..end])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
    }

    #[inline]
    fn first(&self) -> Option<u8> {
        self.json.first().copied()
    }

    #[inline]
    fn last(&self) -> Option<u8> {
        self.json.last().copied()
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        &self.json == NULL
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        &self.json == TRUE
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        &self.json == FALSE
    }

    /// Reports true only for the exact `true` and `false` literals. Strings
    /// holding a boolean are not considered.
    #[inline]
    pub fn is_bool(&self) -> bool {
        self.is_true() || self.is_false()
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        self.first() == Some(b'"')
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.first(), Some(b'0'..=b'9' | b'-'))
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.first() == Some(b'{')
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.first() == Some(b'[')
    }

    /// Classify the value from its first byte. Returns `None` for empty input
    /// and for bytes that can not start a JSON value.
    pub fn json_type(&self) -> Option<JsonType> {
        match self.first()? {
            b'n' => Some(JsonType::Null),
            b't' | b'f' => Some(JsonType::Boolean),
            b'0'..=b'9' | b'-' => Some(JsonType::Number),
            b'"' => Some(JsonType::String),
            b'{' => Some(JsonType::Object),
            b'[' => Some(JsonType::Array),
            _ => None,
        }
    }

    /// A heuristic well-formedness check.
    ///
    /// Numbers must parse as a finite float. Strings, arrays and objects must
    /// end with their matching delimiter and then fully decode. Literals must
    /// match exactly. Anything else, including empty input, is malformed.
    pub fn is_malformed(&self) -> bool {
        let Some(first) = self.first() else {
            return true;
        };
        match first {
            b'0'..=b'9' | b'-' => match core::str::from_utf8(&self.json) {
                Ok(s) => !matches!(s.parse::<f64>(), Ok(f) if f.is_finite()),
                Err(_) => true,
            },
            b'[' => !self.is_delimited(b']') || !self.decodes(),
            b'{' => !self.is_delimited(b'}') || !self.decodes(),
            b'"' => !self.is_delimited(b'"') || !self.decodes(),
            b't' => !self.is_true(),
            b'f' => !self.is_false(),
            b'n' => !self.is_null(),
            _ => true,
        }
    }

    #[inline]
    fn is_delimited(&self, close: u8) -> bool {
        self.json.len() > 1 && self.last() == Some(close)
    }

    fn decodes(&self) -> bool {
        serde_json::from_slice::<IgnoredAny>(&self.json).is_ok()
    }

    /// Reports whether the bytes contain a `\`, i.e. whether a string value
    /// needs unescaping.
    pub fn contains_escape(&self) -> bool {
        self.json.contains(&b'\\')
    }

    /// Strip surrounding double quotes without processing escapes. Bytes that
    /// are not quoted are returned as they are.
    pub fn unquoted(&self) -> &[u8] {
        if self.is_delimited(b'"') && self.is_string() {
            &self.json[1..self.json.len() - 1]
        } else {
            &self.json
        }
    }
}

impl<'a> From<&'a [u8]> for &'a RawJson {
    fn from(value: &'a [u8]) -> Self {
        RawJson::new(value)
    }
}

impl<'a> From<&'a str> for &'a RawJson {
    fn from(value: &'a str) -> Self {
        RawJson::from_str(value)
    }
}

impl AsRef<[u8]> for RawJson {
    fn as_ref(&self) -> &[u8] {
        &self.json
    }
}

impl Debug for RawJson {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_tuple("RawJson")
            .field(&format_args!("{}", String::from_utf8_lossy(&self.json)))
            .finish()
    }
}

impl Display for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.json))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw(s: &str) -> &RawJson {
        RawJson::from_str(s)
    }

    #[test]
    fn test_literals() {
        assert!(raw("null").is_null());
        assert!(raw("true").is_true());
        assert!(raw("false").is_false());
        assert!(raw("true").is_bool());
        assert!(raw("false").is_bool());
        assert!(!raw("tru").is_bool());
        assert!(!raw("\"true\"").is_bool());
        assert!(!raw("nul").is_null());
    }

    #[test]
    fn test_classify() {
        assert!(raw("\"a\"").is_string());
        assert!(raw("-1").is_number());
        assert!(raw("0.5").is_number());
        assert!(raw("{}").is_object());
        assert!(raw("[]").is_array());
        assert_eq!(raw("123").json_type(), Some(JsonType::Number));
        assert_eq!(raw("t").json_type(), Some(JsonType::Boolean));
        assert_eq!(raw("x").json_type(), None);
    }

    #[test]
    fn test_empty_input() {
        let empty = raw("");
        assert!(!empty.is_null());
        assert!(!empty.is_bool());
        assert!(!empty.is_string());
        assert!(!empty.is_number());
        assert!(!empty.is_object());
        assert!(!empty.is_array());
        assert_eq!(empty.json_type(), None);
        assert!(empty.is_malformed());
    }

    #[test]
    fn test_malformed() {
        assert!(raw("[1,2").is_malformed());
        assert!(!raw("[1,2]").is_malformed());
        assert!(raw("[").is_malformed());
        assert!(raw("[1,]").is_malformed());
        assert!(!raw("{\"a\":1}").is_malformed());
        assert!(raw("{\"a\":1").is_malformed());
        assert!(raw("{\"a\"}").is_malformed());
        assert!(!raw("\"abc\"").is_malformed());
        assert!(raw("\"").is_malformed());
        assert!(raw("\"abc").is_malformed());
        assert!(raw("\"bad\\q\"").is_malformed());
        assert!(!raw("12.5e3").is_malformed());
        assert!(raw("12a").is_malformed());
        assert!(raw("-inf").is_malformed());
        assert!(!raw("true").is_malformed());
        assert!(raw("trUe").is_malformed());
        assert!(raw("fals").is_malformed());
        assert!(raw("nil").is_malformed());
        assert!(raw("'a'").is_malformed());
    }

    #[test]
    fn test_trimmed() {
        let r = raw("  \n null\t ");
        assert!(!r.is_null());
        assert!(r.trimmed().is_null());
        assert!(raw("   ").trimmed().is_empty());
    }

    #[test]
    fn test_unquoted() {
        assert_eq!(raw("\"a\\nb\"").unquoted(), b"a\\nb");
        assert!(raw("\"a\\nb\"").contains_escape());
        assert!(!raw("\"ab\"").contains_escape());
        assert_eq!(raw("12").unquoted(), b"12");
        assert_eq!(raw("\"").unquoted(), b"\"");
    }
}
