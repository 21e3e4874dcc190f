//! One-of-N values: a single logical value held in exactly one of several
//! kind-specific slots.
//!
//! `set` tries the slots in a fixed order and keeps the first coercion that
//! yields a value, with text as the fallback that always succeeds. Kind
//! accessors (`as_number`, `as_bool`, `as_timestamp`, ...) take `&mut self`:
//! when the text slot is occupied and parses as the requested kind, the value
//! moves to that slot so later reads do not parse again. The `peek_*`
//! counterparts take `&self` and never move anything.
//!
//! On the wire the shape decides the slot. Strings land in the text slot,
//! except that variants with a number slot take back the quoted numbers their
//! own encoder writes beyond [`MAX_SAFE_INTEGER`](crate::serde::MAX_SAFE_INTEGER).

mod bool_or_text;
mod text_number_bool_or_timestamp;
mod text_number_or_timestamp;
mod text_or_number;

use core::fmt;

use chrono::{DateTime, FixedOffset};
use faststr::FastStr;

pub use self::{
    bool_or_text::BoolOrText, text_number_bool_or_timestamp::TextNumberBoolOrTimestamp,
    text_number_or_timestamp::TextNumberOrTimestamp, text_or_number::TextOrNumber,
};
use crate::config::TimeLayouts;
use crate::serde::{Number, Scalar};
use crate::value::parse_bool;

/// The slot a variant currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Text,
    Number,
    Timestamp,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Bool => "bool",
            Kind::Text => "text",
            Kind::Number => "number",
            Kind::Timestamp => "timestamp",
        })
    }
}

/// A number parsed from text, only when the text holds one.
pub(crate) fn text_as_number(s: &str) -> Option<Number> {
    s.parse::<Number>().ok().filter(Number::has_value)
}

pub(crate) fn text_as_bool(s: &str) -> Option<bool> {
    parse_bool(s).ok().flatten()
}

pub(crate) fn text_as_timestamp(s: &str, layouts: &TimeLayouts) -> Option<DateTime<FixedOffset>> {
    layouts.parse(s).ok()
}

/// The number a decoded string stands for, when it is exactly the quoted
/// text the number encoder writes beyond the safe integer range.
pub(crate) fn quoted_big_number(s: &str) -> Option<Number> {
    let n = text_as_number(s)?;
    match n.to_scalar() {
        Scalar::Str(quoted) if quoted.as_str() == s => Some(n),
        _ => None,
    }
}

pub(crate) fn empty_scalar(encode_nil_as_empty: bool) -> Scalar {
    if encode_nil_as_empty {
        Scalar::Str(FastStr::empty())
    } else {
        Scalar::Null
    }
}

pub(crate) fn timestamp_scalar(t: &DateTime<FixedOffset>) -> Scalar {
    Scalar::Str(FastStr::from_string(TimeLayouts::current().primary().format(t)))
}

pub(crate) fn fmt_timestamp(t: &DateTime<FixedOffset>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&TimeLayouts::current().primary().format(t))
}

/// The surface every variant shares. The variant must hold a `slot` whose
/// type has `kind`, `text`, `to_input` and `Display`, an
/// `encode_nil_as_empty` flag, and define `set`, `to_scalar` and
/// `slot_from_scalar`.
macro_rules! impl_variant {
    ($name:ident) => {
        impl $name {
            pub(crate) const NAME: &'static str = stringify!($name);

            /// Build a variant from any input, see `set`.
            pub fn new(value: impl Into<$crate::input::Input>) -> Self {
                let mut v = Self::default();
                v.set(value);
                v
            }

            #[inline]
            pub fn clear(&mut self) {
                self.slot = Slot::Empty;
            }

            #[inline]
            pub fn is_nil(&self) -> bool {
                matches!(self.slot, Slot::Empty)
            }

            /// The occupied slot, `None` when empty. Never reinterprets.
            #[inline]
            pub fn kind(&self) -> Option<$crate::variant::Kind> {
                self.slot.kind()
            }

            /// Reports whether the text slot is occupied. A kind accessor that
            /// succeeded earlier may have moved the text to another slot.
            #[inline]
            pub fn is_text(&self) -> bool {
                self.kind() == Some($crate::variant::Kind::Text)
            }

            /// The text slot, if occupied.
            #[inline]
            pub fn as_text(&self) -> Option<&str> {
                self.slot.text().map(|s| s.as_str())
            }

            /// Reports true when empty or holding `""`.
            pub fn is_empty_string(&self) -> bool {
                match self.slot.text() {
                    Some(s) => s.is_empty(),
                    None => self.is_nil(),
                }
            }

            /// Encode an empty variant as `""` instead of `null`.
            pub fn encode_nil_as_empty_string(&mut self) {
                self.encode_nil_as_empty = true;
            }

            /// Encode an empty variant as `null`, the default.
            pub fn encode_nil_as_null(&mut self) {
                self.encode_nil_as_empty = false;
            }

            #[inline]
            pub fn encodes_nil_as_empty_string(&self) -> bool {
                self.encode_nil_as_empty
            }

            pub fn to_json(&self) -> $crate::error::Result<Vec<u8>> {
                self.to_scalar().to_json()
            }

            pub fn to_writer<W: std::io::Write>(&self, writer: W) -> $crate::error::Result<()> {
                self.to_scalar().write(writer)
            }

            /// Replace the value with the one decoded from raw JSON. The
            /// encoding flag is kept.
            pub fn read_json(&mut self, json: &[u8]) -> $crate::error::Result<()> {
                self.slot = Slot::Empty;
                let scalar = $crate::serde::Scalar::read(json, Self::NAME)?;
                self.slot = Self::slot_from_scalar(scalar)
                    .map_err(|e| e.with_context(json, Self::NAME))?;
                Ok(())
            }

            pub fn from_json(json: &[u8]) -> $crate::error::Result<Self> {
                let mut v = Self::default();
                v.read_json(json)?;
                Ok(v)
            }
        }

        impl PartialEq for $name {
            /// Compares the slots only; the encoding flag is ignored.
            fn eq(&self, other: &Self) -> bool {
                self.slot == other.slot
            }
        }

        impl Eq for $name {}

        impl core::hash::Hash for $name {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.slot.hash(state);
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.slot, f)
            }
        }

        impl From<&$name> for $crate::input::Input {
            fn from(v: &$name) -> Self {
                v.slot.to_input()
            }
        }

        impl From<$name> for $crate::input::Input {
            fn from(v: $name) -> Self {
                v.slot.to_input()
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&self.to_scalar(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let scalar = $crate::serde::deserialize_scalar(deserializer, Self::NAME)?;
                let slot = Self::slot_from_scalar(scalar).map_err(serde::de::Error::custom)?;
                Ok(Self {
                    slot,
                    encode_nil_as_empty: false,
                })
            }
        }
    };
}

/// Numeric accessors over `as_number`, for variants with a number slot.
macro_rules! impl_number_accessors {
    ($name:ident) => {
        $crate::variant::impl_number_accessors!(@impl $name,
            as_i64 -> i64, as_u64 -> u64, as_f64 -> f64, as_f32 -> f32,
            as_i32 -> i32, as_i16 -> i16, as_i8 -> i8, as_isize -> isize,
            as_u32 -> u32, as_u16 -> u16, as_u8 -> u8, as_usize -> usize
        );
    };
    (@impl $name:ident, $($method:ident -> $ty:ty),*) => {
        impl $name {
            $(
                #[doc = concat!(
                    "The number slot as `", stringify!($ty), "`, moving parseable text to ",
                    "the number slot first. `None` unless the number converts exactly."
                )]
                pub fn $method(&mut self) -> Option<$ty> {
                    self.as_number().and_then(|n| n.$method())
                }
            )*
        }
    };
}

pub(crate) use {impl_number_accessors, impl_variant};
