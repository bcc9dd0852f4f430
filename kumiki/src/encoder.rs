//! Encoder trait, the reverse direction of [`crate::decoder::Decoder`].

/// Encoder trait for converting `T` into its encoded form `E`.
///
/// Implemented by the source type. The target type must implement
/// `EncodableTo<T>`.
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` is an encoding of type `T`.
pub trait EncodableTo<T> {}
