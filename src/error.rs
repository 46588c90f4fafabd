
//! Error type definitions.

use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;


/// A result that may contain a pixel access error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a pixel access error.
pub type UnitResult = Result<()>;


/// An error that may happen while creating or accessing bitmap data.
/// Distinguishes between configuration problems, unsupported
/// operations, coordinate problems, and stream errors.
#[derive(Debug)]
pub enum Error {

    /// The bitmap data was configured in a way that cannot work,
    /// for example a custom format without any callbacks,
    /// or a buffer that is too short for the requested size.
    /// Also used for pixel data that contradicts the palette.
    Invalid(Cow<'static, str>),

    /// The format does not support the requested operation,
    /// for example reading a custom format that only has setters,
    /// or accessing palette indices of a non-indexed format.
    NotSupported(Cow<'static, str>),

    /// A coordinate, byte offset or palette index is outside the valid range.
    OutOfBounds(Cow<'static, str>),

    /// A raw multi-byte access at a byte offset that is not a multiple of the value alignment.
    Misaligned {

        /// The requested byte offset inside the row.
        offset: usize,

        /// The alignment of the accessed value type, in bytes.
        alignment: usize,
    },

    /// The bitmap data has already been disposed.
    Disposed,

    /// Reading or writing raw rows from or to a stream failed.
    Io(IoError),
}


impl Error {

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }

    /// Create an error of the variant `NotSupported`.
    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Error::NotSupported(message.into())
    }

    /// Create an error of the variant `OutOfBounds`.
    pub(crate) fn out_of_bounds(message: impl Into<Cow<'static, str>>) -> Self {
        Error::OutOfBounds(message.into())
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::invalid("stream ended before all rows were read")
        }
        else {
            Error::Io(error)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(formatter),
            Error::NotSupported(message) => write!(formatter, "not supported: {}", message),
            Error::Invalid(message) => write!(formatter, "invalid: {}", message),
            Error::OutOfBounds(message) => write!(formatter, "out of bounds: {}", message),
            Error::Misaligned { offset, alignment } => write!(
                formatter, "misaligned raw access at byte offset {} (alignment {})",
                offset, alignment
            ),
            Error::Disposed => formatter.write_str("bitmap data has been disposed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}


/// Return error on values that do not fit into the specified maximum.
#[inline]
pub(crate) fn check_index(index: usize, count: usize, error_message: &'static str) -> UnitResult {
    if index < count { Ok(()) }
    else { Err(Error::out_of_bounds(format!("{} {} (must be less than {})", error_message, index, count))) }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eof_is_reported_as_invalid_data() {
        let error: Error = IoError::new(ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(error, Error::Invalid(_)));

        let error: Error = IoError::new(ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn index_check_names_the_limit() {
        assert!(check_index(3, 4, "x").is_ok());

        let message = check_index(4, 4, "x").unwrap_err().to_string();
        assert_eq!(message, "out of bounds: x 4 (must be less than 4)");
    }
}
