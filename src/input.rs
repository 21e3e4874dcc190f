use std::fmt::Display;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone};
use faststr::FastStr;

use crate::serde::{Number, NumberValue, RawNumber};
use crate::value::{Bool, Text, Timestamp};

/// Input is the closed set of dynamically typed values every box and variant
/// can be set from.
///
/// Values are usually built through the `From` conversions, so `set` and
/// `new` accept plain Rust values:
///
/// ```
/// use flexscalar::{Number, TextOrNumber};
///
/// let n = Number::new(255u8).unwrap();
/// assert_eq!(n.as_u64(), Some(255));
///
/// let v = TextOrNumber::new("not a number");
/// assert!(v.is_text());
/// ```
///
/// Anything implementing `Display` can be passed as text with
/// [`Input::display`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Input {
    /// No value. Setting it leaves the target empty.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Kept apart from `Float` so that it can be widened through its
    /// shortest decimal text instead of bit for bit.
    Float32(f32),
    Str(FastStr),
    Bytes(Bytes),
    /// A list of strings. Formats to text by joining with `,`.
    List(Vec<FastStr>),
    RawNumber(RawNumber),
    Number(Number),
    Timestamp(DateTime<FixedOffset>),
}

impl Input {
    /// Text input from anything that can be displayed.
    pub fn display<T: Display + ?Sized>(value: &T) -> Input {
        Input::Str(FastStr::new(value.to_string()))
    }

    /// A short name of the input's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Input::Null => "null",
            Input::Bool(_) => "bool",
            Input::Int(_) => "signed integer",
            Input::Uint(_) => "unsigned integer",
            Input::Float(_) => "float",
            Input::Float32(_) => "float32",
            Input::Str(_) => "string",
            Input::Bytes(_) => "bytes",
            Input::List(_) => "list of strings",
            Input::RawNumber(_) => "number literal",
            Input::Number(_) => "number",
            Input::Timestamp(_) => "timestamp",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Input::Null)
    }
}

macro_rules! impl_from_signed {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Input {
                #[inline]
                fn from(i: $ty) -> Self {
                    Input::Int(i as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Input {
                #[inline]
                fn from(u: $ty) -> Self {
                    Input::Uint(u as u64)
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Input {
    fn from(b: bool) -> Self {
        Input::Bool(b)
    }
}

impl From<f64> for Input {
    fn from(f: f64) -> Self {
        Input::Float(f)
    }
}

impl From<f32> for Input {
    fn from(f: f32) -> Self {
        Input::Float32(f)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Str(FastStr::new(s))
    }
}

impl From<&String> for Input {
    fn from(s: &String) -> Self {
        Input::Str(FastStr::new(s))
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Str(FastStr::from_string(s))
    }
}

impl From<FastStr> for Input {
    fn from(s: FastStr) -> Self {
        Input::Str(s)
    }
}

impl From<&[u8]> for Input {
    fn from(b: &[u8]) -> Self {
        Input::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Input {
    fn from(b: Vec<u8>) -> Self {
        Input::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for Input {
    fn from(b: Bytes) -> Self {
        Input::Bytes(b)
    }
}

impl From<Vec<String>> for Input {
    fn from(list: Vec<String>) -> Self {
        Input::List(list.into_iter().map(FastStr::from_string).collect())
    }
}

impl From<&[&str]> for Input {
    fn from(list: &[&str]) -> Self {
        Input::List(list.iter().map(|s| FastStr::new(s)).collect())
    }
}

impl From<Vec<FastStr>> for Input {
    fn from(list: Vec<FastStr>) -> Self {
        Input::List(list)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Input {
    fn from(t: DateTime<Tz>) -> Self {
        Input::Timestamp(t.fixed_offset())
    }
}

impl From<RawNumber> for Input {
    fn from(n: RawNumber) -> Self {
        Input::RawNumber(n)
    }
}

impl From<Number> for Input {
    fn from(n: Number) -> Self {
        Input::Number(n)
    }
}

impl From<NumberValue> for Input {
    fn from(n: NumberValue) -> Self {
        match n {
            NumberValue::Int(i) => Input::Int(i),
            NumberValue::Uint(u) => Input::Uint(u),
            NumberValue::Float(f) => Input::Float(f),
        }
    }
}

impl From<Bool> for Input {
    fn from(b: Bool) -> Self {
        b.get().map_or(Input::Null, Input::Bool)
    }
}

impl From<&Text> for Input {
    fn from(t: &Text) -> Self {
        t.get_faststr().cloned().map_or(Input::Null, Input::Str)
    }
}

impl From<Text> for Input {
    fn from(t: Text) -> Self {
        Input::from(&t)
    }
}

impl From<&Timestamp> for Input {
    fn from(t: &Timestamp) -> Self {
        t.get().map_or(Input::Null, Input::Timestamp)
    }
}

impl From<Timestamp> for Input {
    fn from(t: Timestamp) -> Self {
        Input::from(&t)
    }
}

impl From<()> for Input {
    fn from(_: ()) -> Self {
        Input::Null
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map_or(Input::Null, Into::into)
    }
}
