//! Error types for ASN.1 element decoding and encoding.

use std::num::ParseIntError;

use kumiki_der::Tag;
use thiserror::Error;

/// Errors that can occur while converting between [`kumiki_der::Tlv`] and
/// typed elements.
#[derive(Debug, Error)]
pub enum Error {
    // Boolean errors
    #[error("BOOLEAN: content must be exactly one byte, got {0}")]
    BooleanInvalidLength(usize),

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: value out of range for {0}")]
    IntegerOutOfRange(&'static str),

    // Null errors
    #[error("NULL: content must be empty, got {0} bytes")]
    NullNotEmpty(usize),

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: component has a leading 0x80 pad byte")]
    ObjectIdentifierNotMinimal,
    #[error("OBJECT IDENTIFIER: component does not fit in 64 bits")]
    ObjectIdentifierComponentOverflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: first component {0} must be 0, 1 or 2")]
    ObjectIdentifierInvalidFirstComponent(u64),
    #[error("OBJECT IDENTIFIER: second component {second} must be below 40 under arc {first}")]
    ObjectIdentifierInvalidSecondComponent { first: u64, second: u64 },
    #[error("OBJECT IDENTIFIER: empty string")]
    ObjectIdentifierEmptyString,
    #[error("OBJECT IDENTIFIER: invalid component '{component}': {source}")]
    ObjectIdentifierInvalidComponent {
        component: String,
        #[source]
        source: ParseIntError,
    },

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),
    #[error("BIT STRING: {0} unused bits declared without any data")]
    BitStringUnusedBitsWithoutData(u8),
    #[error("BIT STRING: only the last segment may have unused bits")]
    BitStringSegmentUnusedBits,

    // String type errors
    #[error("UTF8String: invalid UTF-8")]
    Utf8StringInvalidUtf8,
    #[error("NumericString: invalid character {0:?}")]
    NumericStringInvalidCharacter(char),
    #[error("PrintableString: invalid encoding")]
    PrintableStringInvalidEncoding,
    #[error("PrintableString: invalid character {0:?}")]
    PrintableStringInvalidCharacter(char),
    #[error("TeletexString: character {0:?} cannot be represented")]
    TeletexStringUnrepresentable(char),
    #[error("IA5String: invalid encoding")]
    Ia5StringInvalidEncoding,
    #[error("IA5String: invalid character {0:?}")]
    Ia5StringInvalidCharacter(char),
    #[error("VisibleString: invalid character {0:?}")]
    VisibleStringInvalidCharacter(char),

    // BMPString errors
    #[error("BMPString: odd byte length {0}")]
    BmpStringOddLength(usize),
    #[error("BMPString: unpaired surrogate")]
    BmpStringUnpairedSurrogate,

    // UniversalString errors
    #[error("UniversalString: byte length {0} is not a multiple of 4")]
    UniversalStringInvalidLength(usize),
    #[error("UniversalString: invalid code point at position {position}: 0x{code_point:08X}")]
    UniversalStringInvalidCodePoint { position: usize, code_point: u32 },

    // Time errors
    #[error("UTCTime: invalid format '{0}'")]
    UtcTimeInvalidFormat(String),
    #[error("UTCTime: year {0} out of range (must be 1950-2049)")]
    UtcTimeYearOutOfRange(i32),
    #[error("GeneralizedTime: invalid format '{0}'")]
    GeneralizedTimeInvalidFormat(String),
    #[error("GeneralizedTime: year {0} out of range (must be 0-9999)")]
    GeneralizedTimeYearOutOfRange(i32),

    // Structure errors
    #[error("{0} must be constructed")]
    ExpectedConstructed(Tag),
    #[error("{0} must be primitive")]
    ExpectedPrimitive(Tag),
    #[error("expected {expected}, got {actual}")]
    UnexpectedElement {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{0} has a typed element and cannot be built as a generic value")]
    GenericUniversalTag(Tag),
    #[error("explicit tag {tag} must wrap exactly one element, got {count}")]
    ExplicitTagElementCount { tag: Tag, count: usize },

    // Choice errors
    #[error("CHOICE {choice}: no alternative for tag {tag}")]
    ChoiceUnknownTag { choice: &'static str, tag: Tag },
    #[error("CHOICE {choice}: unknown alternative '{alternative}'")]
    ChoiceUnknownAlternative {
        choice: &'static str,
        alternative: &'static str,
    },

    // DER errors
    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[from] kumiki_der::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the innermost error, looking through every layer of context.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Adds context to an error while keeping the original as its source.
///
/// ```
/// use kumiki_asn1::error::{Error, ResultExt};
///
/// let result: Result<(), Error> = Err(Error::IntegerNoData);
/// let err = result.context("while decoding field version").unwrap_err();
/// assert_eq!("while decoding field version: INTEGER: no data", err.to_string());
/// assert!(matches!(err.root_cause(), Error::IntegerNoData));
/// ```
pub trait ResultExt<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: context.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
