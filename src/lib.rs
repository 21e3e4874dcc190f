//! Flexible JSON scalars.
//!
//! - [`Number`] keeps integers exact across the full `i64` and `u64` ranges
//!   and writes integers beyond [`MAX_SAFE_INTEGER`] as quoted strings.
//! - [`Bool`], [`Text`] and [`Timestamp`] are optional boxes that coerce from
//!   loosely typed input.
//! - [`BoolOrText`], [`TextOrNumber`], [`TextNumberOrTimestamp`] and
//!   [`TextNumberBoolOrTimestamp`] hold one value in one of several slots and
//!   reinterpret text on demand.
//! - [`RawJson`] sniffs the shape of raw JSON bytes without decoding them.
//!
//! ```
//! use flexscalar::TextNumberBoolOrTimestamp;
//!
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Row {
//!     id: TextNumberBoolOrTimestamp,
//! }
//!
//! let json = r#"{"id":"18446744073709551615"}"#;
//! let mut row: Row = serde_json::from_str(json).unwrap();
//! assert_eq!(row.id.as_u64(), Some(u64::MAX));
//! assert_eq!(serde_json::to_string(&row).unwrap(), json);
//! ```

mod config;
mod error;
mod input;
mod raw;
mod variant;

pub mod format;
pub mod serde;
pub mod value;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::input::*;
pub use crate::raw::*;
pub use crate::variant::*;

pub use crate::serde::*;
pub use crate::value::*;
