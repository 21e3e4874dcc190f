//! When coercing, encoding or decoding a flexible scalar goes wrong.

use core::fmt::{self, Debug, Display};
use core::result;
use serde::{de, ser};
use std::error;

/// This type represents all possible errors that can occur when setting,
/// parsing, encoding or decoding a flexible scalar.
pub struct Error {
    /// This `Box` allows us to keep the size of `Error` as small as possible. A
    /// larger `Error` type was substantially slower due to all the functions
    /// that pass around `Result<T, Error>`.
    err: Box<ErrorImpl>,
}

/// Alias for a `Result` with the error type `flexscalar::Error`.
pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// Categorizes the cause of this error.
    ///
    /// - `Category::InvalidValue` - the input does not parse as the target kind
    /// - `Category::InvalidType` - the input's kind is not accepted at all
    /// - `Category::TypeMismatch` - the JSON shape does not fit the target
    /// - `Category::IndexOutOfBounds` - a list accessor was misused
    /// - `Category::Io` - failure to write the encoded bytes
    /// - `Category::Data` - any other error raised through serde
    pub fn classify(&self) -> Category {
        self.err.code.classify()
    }

    /// Returns true if the input did not parse as the target kind, such as a
    /// bad numeral, boolean literal or timestamp.
    pub fn is_invalid_value(&self) -> bool {
        self.classify() == Category::InvalidValue
    }

    /// Returns true if the input's kind is not one the target accepts.
    pub fn is_invalid_type(&self) -> bool {
        self.classify() == Category::InvalidType
    }

    /// Returns true if the JSON wire shape was incompatible with the target.
    pub fn is_type_mismatch(&self) -> bool {
        self.classify() == Category::TypeMismatch
    }

    /// Returns true if this error was caused by a failure to write bytes on an
    /// I/O stream.
    pub fn is_io(&self) -> bool {
        self.classify() == Category::Io
    }

    /// Returns true if an index was outside of a list.
    pub fn is_index_out_of_bounds(&self) -> bool {
        self.classify() == Category::IndexOutOfBounds
    }

    /// The raw JSON that failed to decode, if this is a decode error.
    pub fn raw(&self) -> Option<&str> {
        self.err.raw.as_deref()
    }

    /// The type the raw JSON was being decoded into, if this is a decode error.
    pub fn expected(&self) -> Option<&'static str> {
        self.err.expected
    }
}

/// Categorizes the cause of a `flexscalar::Error`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Category {
    /// A string or typed input did not parse as the target kind.
    InvalidValue,

    /// The input's dynamic kind is not among the kinds the target accepts.
    InvalidType,

    /// The JSON wire shape is incompatible with the target, for example an
    /// object where a scalar is expected.
    TypeMismatch,

    /// A sequence accessor was given an index outside of the sequence.
    IndexOutOfBounds,

    /// The error was caused by a failure to write bytes on an I/O stream.
    Io,

    /// Any other error reported through serde.
    Data,
}

#[allow(clippy::fallible_impl_from)]
impl From<Error> for std::io::Error {
    /// Convert a `flexscalar::Error` into an `std::io::Error`.
    ///
    /// I/O errors are unwrapped, every other error is turned into an
    /// `InvalidData` I/O error.
    fn from(j: Error) -> Self {
        if let ErrorCode::Io(err) = j.err.code {
            err
        } else {
            std::io::Error::new(std::io::ErrorKind::InvalidData, j)
        }
    }
}

struct ErrorImpl {
    code: ErrorCode,
    raw: Option<Box<str>>,
    expected: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorCode {
    /// Catchall for messages raised through serde.
    #[error("{0}")]
    Message(Box<str>),

    /// Some I/O error occurred while encoding.
    #[error("{0}")]
    Io(std::io::Error),

    /// The input does not parse as the target kind.
    #[error("invalid value: {0}")]
    InvalidValue(Box<str>),

    /// The input's kind is not accepted by the target.
    #[error("invalid type: {found} is not {expected}")]
    InvalidType {
        found: &'static str,
        expected: &'static str,
    },

    /// The JSON shape is incompatible with the target.
    #[error("type mismatch")]
    TypeMismatch,

    /// List access outside of the list.
    #[error("index out of bounds: the len is {len} but the index is {index}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl ErrorCode {
    pub fn classify(&self) -> Category {
        match self {
            ErrorCode::Message(_) => Category::Data,
            ErrorCode::Io(_) => Category::Io,
            ErrorCode::InvalidValue(_) => Category::InvalidValue,
            ErrorCode::InvalidType { .. } => Category::InvalidType,
            ErrorCode::TypeMismatch => Category::TypeMismatch,
            ErrorCode::IndexOutOfBounds { .. } => Category::IndexOutOfBounds,
        }
    }
}

impl Error {
    #[cold]
    fn new(code: ErrorCode) -> Self {
        Error {
            err: Box::new(ErrorImpl {
                code,
                raw: None,
                expected: None,
            }),
        }
    }

    #[cold]
    pub(crate) fn invalid_value<T: Display>(msg: T) -> Self {
        Error::new(ErrorCode::InvalidValue(msg.to_string().into_boxed_str()))
    }

    #[cold]
    pub(crate) fn invalid_type(found: &'static str, expected: &'static str) -> Self {
        Error::new(ErrorCode::InvalidType { found, expected })
    }

    #[cold]
    pub(crate) fn type_mismatch(expected: &'static str) -> Self {
        let mut err = Error::new(ErrorCode::TypeMismatch);
        err.err.expected = Some(expected);
        err
    }

    #[cold]
    pub(crate) fn io(error: std::io::Error) -> Self {
        Error::new(ErrorCode::Io(error))
    }

    #[cold]
    pub(crate) fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Error::new(ErrorCode::IndexOutOfBounds { index, len })
    }

    /// Attach the offending raw JSON and the expected target, keeping the
    /// code. Context already present is not overwritten.
    #[cold]
    pub(crate) fn with_context(mut self, raw: &[u8], expected: &'static str) -> Self {
        if self.err.raw.is_none() {
            self.err.raw = Some(String::from_utf8_lossy(raw).into());
        }
        if self.err.expected.is_none() {
            self.err.expected = Some(expected);
        }
        self
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.err.code, f)?;
        match (&self.err.raw, self.err.expected) {
            (Some(raw), Some(expected)) => {
                write!(f, ": can not decode `{}` into {}", raw, expected)
            }
            (None, Some(expected)) => write!(f, ": expected {}", expected),
            _ => Ok(()),
        }
    }
}

// Remove two layers of verbosity from the debug representation. Humans often
// end up seeing this representation because it is what unwrap() shows.
impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error({:?}", self.err.code.to_string())?;
        if let Some(raw) = &self.err.raw {
            write!(f, ", raw: {:?}", raw)?;
        }
        if let Some(expected) = self.err.expected {
            write!(f, ", expected: {:?}", expected)?;
        }
        f.write_str(")")
    }
}

impl error::Error for Error {}

impl de::Error for Error {
    #[cold]
    fn custom<T: Display>(msg: T) -> Error {
        Error::new(ErrorCode::Message(msg.to_string().into_boxed_str()))
    }

    #[cold]
    fn invalid_type(unexp: de::Unexpected, exp: &dyn de::Expected) -> Self {
        if let de::Unexpected::Unit = unexp {
            <Error as de::Error>::custom(format_args!("invalid type: null, expected {}", exp))
        } else {
            <Error as de::Error>::custom(format_args!("invalid type: {}, expected {}", unexp, exp))
        }
    }
}

impl ser::Error for Error {
    #[cold]
    fn custom<T: Display>(msg: T) -> Error {
        Error::new(ErrorCode::Message(msg.to_string().into_boxed_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_classify() {
        assert!(Error::invalid_value("\"x\" is not a number").is_invalid_value());
        assert!(Error::invalid_type("bool", "a number").is_invalid_type());
        assert!(Error::type_mismatch("Number").is_type_mismatch());
        assert!(Error::io(std::io::ErrorKind::WriteZero.into()).is_io());
        assert!(Error::index_out_of_bounds(3, 1).is_index_out_of_bounds());
        assert_eq!(
            <Error as de::Error>::custom("boom").classify(),
            Category::Data
        );
    }

    #[test]
    fn test_error_context() {
        let err = Error::type_mismatch("Number");
        assert_eq!(err.raw(), None);
        assert_eq!(err.to_string(), "type mismatch: expected Number");

        let err = err.with_context(b"[1,2]", "Number");
        assert_eq!(err.raw(), Some("[1,2]"));
        assert_eq!(err.expected(), Some("Number"));
        assert_eq!(
            err.to_string(),
            "type mismatch: can not decode `[1,2]` into Number"
        );

        // the first context wins
        let err = err.with_context(b"{}", "Bool");
        assert_eq!(err.raw(), Some("[1,2]"));
        assert_eq!(err.expected(), Some("Number"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::index_out_of_bounds(5, 1);
        assert_eq!(
            err.to_string(),
            "index out of bounds: the len is 1 but the index is 5"
        );
        let err = Error::invalid_type("bool", "a number");
        assert_eq!(err.to_string(), "invalid type: bool is not a number");
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
        let io: std::io::Error = Error::io(std::io::ErrorKind::WriteZero.into()).into();
        assert_eq!(io.kind(), std::io::ErrorKind::WriteZero);
    }
}
