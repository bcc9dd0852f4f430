//! Error types for tag-length-value decoding.

use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

/// Errors raised while reading the tag-length-value structure of a buffer.
///
/// Every variant is produced as close as possible to the offending bytes.
/// None of them leave a partially decoded value behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("empty input")]
    Empty,
    #[error("truncated input: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    // Tag errors
    #[error("tag number does not fit in 32 bits")]
    TagNumberOverflow,
    #[error("tag number is not in its shortest form")]
    TagNumberNotMinimal,

    // Length errors
    #[error("reserved length octet 0xFF")]
    ReservedLength,
    #[error("length uses {0} octets, which does not fit in usize")]
    LengthOverflow(usize),
    #[error("length is not in its shortest form")]
    LengthNotMinimal,
    #[error("indefinite length is not allowed")]
    IndefiniteLengthNotAllowed,
    #[error("indefinite length on a primitive value")]
    IndefinitePrimitive,

    // Structure errors
    #[error("nesting depth exceeds the limit of {max}")]
    DepthLimitExceeded { max: usize },
    #[error("end-of-contents marker outside an indefinite-length value")]
    UnexpectedEndOfContents,
    #[error("missing end-of-contents marker")]
    MissingEndOfContents,
    #[error("end-of-contents marker must have zero length")]
    MalformedEndOfContents,
    #[error("{0} trailing bytes after the last value")]
    TrailingData(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

// The byte readers only fail when the input runs out.
impl<'a> ParseError<&'a [u8]> for Error {
    fn from_error_kind(input: &'a [u8], _kind: ErrorKind) -> Self {
        Error::Truncated {
            needed: 1,
            remaining: input.len(),
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(needed) => Error::Truncated {
                needed: match needed {
                    nom::Needed::Size(n) => n.get(),
                    nom::Needed::Unknown => 1,
                },
                remaining: 0,
            },
        }
    }
}
