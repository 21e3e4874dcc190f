use core::fmt::{self, Debug, Display};
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use std::io;

use faststr::FastStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{deserialize_scalar, Scalar};
use crate::error::{Error, Result};
use crate::input::Input;

/// The largest integer magnitude an IEEE-754 double represents exactly,
/// `2^53 - 1`. Numbers beyond it are encoded as JSON strings.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// The negation of [`MAX_SAFE_INTEGER`].
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

/// A nullable number stored in the narrowest form that holds it losslessly:
/// a signed integer, an unsigned integer or a finite float.
///
/// Integers and floats whose magnitude exceeds [`MAX_SAFE_INTEGER`] are
/// encoded as JSON strings holding their decimal text, so that consumers
/// parsing JSON numbers into doubles do not lose precision. Decoding accepts
/// both the bare and the quoted form.
///
/// ```
/// use flexscalar::Number;
///
/// let n = Number::new(u64::MAX).unwrap();
/// assert_eq!(n.to_json().unwrap(), br#""18446744073709551615""#);
///
/// let back = Number::from_json(br#""18446744073709551615""#).unwrap();
/// assert_eq!(back.as_u64(), Some(u64::MAX));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Number {
    n: Option<NumberValue>,
}

/// The representation held by a [`Number`].
#[derive(Debug, Copy, Clone)]
pub enum NumberValue {
    Int(i64),
    Uint(u64),
    /// Always finite.
    Float(f64),
}

impl PartialEq for NumberValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberValue::Int(a), NumberValue::Int(b)) => a == b,
            (NumberValue::Uint(a), NumberValue::Uint(b)) => a == b,
            (NumberValue::Float(a), NumberValue::Float(b)) => a == b,
            // the same integer may be held signed or unsigned
            (NumberValue::Int(i), NumberValue::Uint(u))
            | (NumberValue::Uint(u), NumberValue::Int(i)) => u64::try_from(*i) == Ok(*u),
            _ => false,
        }
    }
}

// Implementing Eq is fine since any float values are always finite.
impl Eq for NumberValue {}

impl Hash for NumberValue {
    fn hash<H: Hasher>(&self, h: &mut H) {
        // non-negative integers hash alike whether held signed or unsigned
        match *self {
            NumberValue::Uint(u) => {
                0u8.hash(h);
                u.hash(h);
            }
            NumberValue::Int(i) => match u64::try_from(i) {
                Ok(u) => {
                    0u8.hash(h);
                    u.hash(h);
                }
                Err(_) => {
                    1u8.hash(h);
                    i.hash(h);
                }
            },
            NumberValue::Float(f) => {
                2u8.hash(h);
                if f == 0.0f64 {
                    // There are 2 zero representations, +0 and -0, which
                    // compare equal but have different bits. We use the +0 hash
                    // for both so that hash(+0) == hash(-0).
                    0.0f64.to_bits().hash(h);
                } else {
                    f.to_bits().hash(h);
                }
            }
        }
    }
}

impl Number {
    pub(crate) const NAME: &'static str = "Number";

    /// Build a number from any accepted input. See [`Number::set`].
    pub fn new(value: impl Into<Input>) -> Result<Number> {
        let mut n = Number::default();
        n.set(value)?;
        Ok(n)
    }

    /// Converts a finite `f64` to a `Number`. Infinite or NaN values are not
    /// JSON numbers.
    #[inline]
    pub fn from_f64(f: f64) -> Option<Number> {
        if f.is_finite() {
            Some(Number {
                n: Some(NumberValue::Float(f)),
            })
        } else {
            None
        }
    }

    /// Replace the value.
    ///
    /// Integers keep their signedness, floats must be finite, `f32` values
    /// are widened through their shortest decimal text. Strings, bytes and
    /// number literals are parsed as described in [`Number::parse`]. Setting
    /// `Input::Null` or an empty string clears the number.
    ///
    /// The number is empty after a failed `set`.
    pub fn set(&mut self, value: impl Into<Input>) -> Result<()> {
        self.n = None;
        self.n = Number::coerce(&value.into())?;
        Ok(())
    }

    pub(crate) fn coerce(input: &Input) -> Result<Option<NumberValue>> {
        match input {
            Input::Null => Ok(None),
            Input::Int(i) => Ok(Some(NumberValue::Int(*i))),
            Input::Uint(u) => Ok(Some(NumberValue::Uint(*u))),
            Input::Float(f) => finite(*f).map(Some),
            Input::Float32(f) => {
                if !f.is_finite() {
                    return Err(Error::invalid_value(format_args!("{} is not a JSON number", f)));
                }
                let mut buffer = ryu::Buffer::new();
                let widened = buffer.format_finite(*f).parse::<f64>().map_err(Error::invalid_value)?;
                Ok(Some(NumberValue::Float(widened)))
            }
            Input::Str(s) => parse_number(s),
            Input::Bytes(b) => match simdutf8::basic::from_utf8(b) {
                Ok(s) => parse_number(s),
                Err(_) => Err(Error::invalid_value("bytes are not valid UTF-8")),
            },
            Input::RawNumber(raw) => parse_number(raw.as_str()),
            Input::Number(n) => Ok(n.n),
            Input::Bool(_) | Input::List(_) | Input::Timestamp(_) => {
                Err(Error::invalid_type(input.kind_name(), "a number"))
            }
        }
    }

    /// Parse text into the number: as an unsigned integer, else as a signed
    /// integer, else as a float. `"255"` is unsigned, `"-1"` is signed and
    /// `"1.5"` is a float.
    ///
    /// Integers may carry a `0x`, `0o` or `0b` radix prefix and `_`
    /// separators between digits. A bare leading zero is decimal, so `"010"` is
    /// 10. An empty string clears the number.
    pub fn parse(&mut self, s: &str) -> Result<()> {
        self.n = None;
        self.n = parse_number(s)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.n = None;
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.n.is_none()
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.n.is_some()
    }

    /// The stored representation.
    #[inline]
    pub fn value(&self) -> Option<NumberValue> {
        self.n
    }

    /// Returns true if the `Number` converts to an i64 exactly.
    ///
    /// For any Number on which `is_i64` returns true, `as_i64` is guaranteed to
    /// return the integer value.
    #[inline]
    pub fn is_i64(&self) -> bool {
        self.as_i64().is_some()
    }

    /// Returns true if the `Number` converts to a u64 exactly.
    #[inline]
    pub fn is_u64(&self) -> bool {
        self.as_u64().is_some()
    }

    /// Returns true if the `Number` is stored as a float.
    #[inline]
    pub fn is_f64(&self) -> bool {
        matches!(self.n, Some(NumberValue::Float(_)))
    }

    /// The value as an i64, if it converts exactly. Floats convert only when
    /// they have no fractional part, unsigned integers only when they fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self.n? {
            NumberValue::Int(i) => Some(i),
            NumberValue::Uint(u) => i64::try_from(u).ok(),
            NumberValue::Float(f) => {
                // -2^63 <= f < 2^63
                if f.fract() == 0.0 && (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f) {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// The value as a u64, if it converts exactly. Negative values never do.
    pub fn as_u64(&self) -> Option<u64> {
        match self.n? {
            NumberValue::Uint(u) => Some(u),
            NumberValue::Int(i) => u64::try_from(i).ok(),
            NumberValue::Float(f) => {
                // 0 <= f < 2^64
                if f.fract() == 0.0 && (0.0..18_446_744_073_709_551_616.0).contains(&f) {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    /// The value as an f64, if it converts exactly. Integers beyond 2^53 that
    /// a double can not hold are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        match self.n? {
            NumberValue::Float(f) => Some(f),
            NumberValue::Int(i) => {
                let f = i as f64;
                (f as i128 == i as i128).then_some(f)
            }
            NumberValue::Uint(u) => {
                let f = u as f64;
                (f as u128 == u as u128).then_some(f)
            }
        }
    }

    /// The value as an f32, if it lies within the range of an f32. The
    /// conversion rounds to the nearest f32.
    pub fn as_f32(&self) -> Option<f32> {
        let f = self.as_f64()?;
        (f.abs() <= f32::MAX as f64).then_some(f as f32)
    }

    /// Encode the number as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(24);
        self.to_writer(&mut buf)?;
        Ok(buf)
    }

    /// Encode the number as JSON into a writer.
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        self.to_scalar().write(writer)
    }

    /// Replace the value with the one decoded from raw JSON.
    ///
    /// `null` clears the number, a JSON number is parsed directly and a JSON
    /// string has its content parsed. Any other shape is a type mismatch.
    pub fn read_json(&mut self, json: &[u8]) -> Result<()> {
        self.n = None;
        let scalar = Scalar::read(json, Number::NAME)?;
        *self = Number::from_scalar(scalar).map_err(|e| e.with_context(json, Number::NAME))?;
        Ok(())
    }

    /// Decode a number from raw JSON.
    pub fn from_json(json: &[u8]) -> Result<Number> {
        let mut n = Number::default();
        n.read_json(json)?;
        Ok(n)
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        match self.n {
            None => Scalar::Null,
            Some(NumberValue::Int(i)) => {
                if (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
                    Scalar::Int(i)
                } else {
                    Scalar::Str(FastStr::new(itoa::Buffer::new().format(i)))
                }
            }
            Some(NumberValue::Uint(u)) => {
                if u <= MAX_SAFE_INTEGER as u64 {
                    Scalar::Uint(u)
                } else {
                    Scalar::Str(FastStr::new(itoa::Buffer::new().format(u)))
                }
            }
            Some(NumberValue::Float(f)) => {
                if f.abs() <= MAX_SAFE_INTEGER as f64 {
                    Scalar::Float(f)
                } else {
                    Scalar::Str(FastStr::new(ryu::Buffer::new().format_finite(f)))
                }
            }
        }
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Number> {
        let n = match scalar {
            Scalar::Null => None,
            Scalar::Int(i) => Some(NumberValue::Int(i)),
            Scalar::Uint(u) => Some(NumberValue::Uint(u)),
            Scalar::Float(f) => Some(finite(f)?),
            Scalar::Str(s) => parse_number(&s)?,
            Scalar::Bool(_) => return Err(Error::type_mismatch(Number::NAME)),
        };
        Ok(Number { n })
    }
}

fn finite(f: f64) -> Result<NumberValue> {
    if f.is_finite() {
        Ok(NumberValue::Float(f))
    } else {
        Err(Error::invalid_value(format_args!("{} is not a JSON number", f)))
    }
}

/// Split a radix prefix off an unsigned integer literal.
fn split_radix(s: &str) -> (u32, &str) {
    match s.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &s[2..]),
        [b'0', b'o' | b'O', ..] => (8, &s[2..]),
        [b'0', b'b' | b'B', ..] => (2, &s[2..]),
        _ => (10, s),
    }
}

/// Parse an unsigned integer literal without sign, honouring radix prefixes
/// and `_` separators placed between digits (or right after a prefix).
pub(crate) fn parse_u64(s: &str) -> Option<u64> {
    let (radix, digits) = split_radix(s);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    if !digits.contains('_') {
        return u64::from_str_radix(digits, radix).ok();
    }
    let mut cleaned = String::with_capacity(digits.len());
    let mut after_digit = radix != 10;
    for c in digits.chars() {
        if c == '_' {
            if !after_digit {
                return None;
            }
            after_digit = false;
        } else {
            cleaned.push(c);
            after_digit = true;
        }
    }
    if !after_digit {
        return None;
    }
    u64::from_str_radix(&cleaned, radix).ok()
}

/// Parse a signed integer literal with an optional leading sign.
pub(crate) fn parse_i64(s: &str) -> Option<i64> {
    let (negative, magnitude) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = parse_u64(magnitude)? as i128;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

pub(crate) fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

pub(crate) fn parse_number(s: &str) -> Result<Option<NumberValue>> {
    if s.is_empty() {
        return Ok(None);
    }
    if let Some(u) = parse_u64(s) {
        return Ok(Some(NumberValue::Uint(u)));
    }
    if let Some(i) = parse_i64(s) {
        return Ok(Some(NumberValue::Int(i)));
    }
    if let Some(f) = parse_f64(s) {
        return Ok(Some(NumberValue::Float(f)));
    }
    Err(Error::invalid_value(format_args!("\"{}\" is not a number", s)))
}

macro_rules! impl_narrow_accessors {
    (
        $($name:ident => $wide:ident as $ty:ty),*
    ) => {
        impl Number {
            $(
                #[doc = concat!("The value as ", stringify!($ty), ", if it converts exactly and fits.")]
                #[inline]
                pub fn $name(&self) -> Option<$ty> {
                    self.$wide().and_then(|v| <$ty>::try_from(v).ok())
                }
            )*
        }
    };
}

impl_narrow_accessors!(
    as_i32 => as_i64 as i32,
    as_i16 => as_i64 as i16,
    as_i8 => as_i64 as i8,
    as_isize => as_i64 as isize,
    as_u32 => as_u64 as u32,
    as_u16 => as_u64 as u16,
    as_u8 => as_u64 as u8,
    as_usize => as_u64 as usize
);

macro_rules! impl_from_unsigned {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(u: $ty) -> Self {
                    Number { n: Some(NumberValue::Uint(u as u64)) }
                }
            }
        )*
    };
}

macro_rules! impl_from_signed {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(i: $ty) -> Self {
                    Number { n: Some(NumberValue::Int(i as i64)) }
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, usize);
impl_from_signed!(i8, i16, i32, i64, isize);

impl From<NumberValue> for Number {
    #[inline]
    fn from(n: NumberValue) -> Self {
        Number { n: Some(n) }
    }
}

impl FromStr for Number {
    type Err = Error;

    fn from_str(s: &str) -> Result<Number> {
        let mut n = Number::default();
        n.parse(s)?;
        Ok(n)
    }
}

impl Display for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.n {
            None => Ok(()),
            Some(NumberValue::Int(i)) => formatter.write_str(itoa::Buffer::new().format(i)),
            Some(NumberValue::Uint(u)) => formatter.write_str(itoa::Buffer::new().format(u)),
            Some(NumberValue::Float(f)) => formatter.write_str(ryu::Buffer::new().format_finite(f)),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.n {
            None => formatter.write_str("Number(nil)"),
            Some(_) => write!(formatter, "Number({})", self),
        }
    }
}

impl Serialize for Number {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_scalar().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Number {
    #[inline]
    fn deserialize<D>(deserializer: D) -> core::result::Result<Number, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scalar = deserialize_scalar(deserializer, Number::NAME)?;
        Number::from_scalar(scalar).map_err(serde::de::Error::custom)
    }
}
