//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The
//! destination must opt in with `DecodableFrom<T>`, which keeps the set of
//! legal conversions closed and visible at compile time.
//!
//! # Implementation Guide
//!
//! ```no_run
//! use kumiki::decoder::{Decoder, DecodableFrom};
//!
//! struct Content(Vec<u8>);
//! struct Flag(bool);
//!
//! #[derive(Debug)]
//! struct FlagError;
//!
//! impl DecodableFrom<Content> for Flag {}
//!
//! impl Decoder<Content, Flag> for Content {
//!     type Error = FlagError;
//!
//!     fn decode(&self) -> Result<Flag, Self::Error> {
//!         match self.0.as_slice() {
//!             [b] => Ok(Flag(*b != 0)),
//!             _ => Err(FlagError),
//!         }
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type. The destination type must implement
/// `DecodableFrom<T>`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error when `self` is not a valid encoding of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T> {}
