//! Nullable single-kind boxes with JSON encoding and decoding.

mod boolean;
mod text;
mod text_list;
mod timestamp;

pub(crate) use self::boolean::parse_bool;
pub(crate) use self::text::{format_input, parse_duration};
pub use self::{boolean::Bool, text::Text, text_list::TextList, timestamp::Timestamp};
