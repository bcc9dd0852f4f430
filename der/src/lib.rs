//! # kumiki-der
//!
//! The tag-length-value layer of the codec: identifier and length octets,
//! the [`Tlv`] node, and a bounds-checked parser that accepts BER input and
//! always re-encodes as DER.
//!
//! ```
//! use kumiki_der::{Tag, parse, tag::universal};
//!
//! let (tlv, consumed) = parse(&[0x30, 0x03, 0x02, 0x01, 0x05]).unwrap();
//! assert_eq!(5, consumed);
//! assert_eq!(&Tag::universal(universal::SEQUENCE, true), tlv.tag());
//! assert_eq!(vec![0x30, 0x03, 0x02, 0x01, 0x05], tlv.encode());
//! ```

#![forbid(unsafe_code)]

use kumiki::decoder::{DecodableFrom, Decoder};
use kumiki::encoder::{EncodableTo, Encoder};

pub mod config;
pub mod error;
pub mod length;
pub mod parser;
pub mod tag;
pub mod tlv;

pub use config::ParseOptions;
pub use error::{Error, Result};
pub use length::{Length, decode_length, encode_length, is_minimal_length, parse_length};
pub use parser::{parse, parse_single, parse_with};
pub use tag::{Tag, TagClass, decode_tag, encode_tag, parse_tag};
pub use tlv::{Tlv, Value};

/// A buffer of one or more concatenated top-level values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Tlv> {
        self.elements
    }

    pub fn parse(input: &[u8]) -> Result<Self> {
        Self::parse_with(input, &ParseOptions::default())
    }

    /// Parses every value in `input`. The buffer must end exactly after the
    /// last complete value.
    pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::Empty);
        }
        let mut elements = Vec::new();
        let mut rest = input;
        while !rest.is_empty() {
            let (tlv, consumed) = parse_with(rest, options)?;
            elements.push(tlv);
            rest = &rest[consumed..];
        }
        Ok(Der { elements })
    }

    /// Concatenated DER encoding of every value.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.elements.iter().map(Tlv::encoded_len).sum());
        for tlv in &self.elements {
            tlv.encode_into(&mut out);
        }
        out
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Der {}

impl<'a> Decoder<&'a [u8], Der> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        Der::parse(self)
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        Der::parse(self)
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::tag::universal;

    #[rstest(input, count,
        case(vec![0x05, 0x00], 1),
        case(vec![0x05, 0x00, 0x02, 0x01, 0x01], 2),
        case(vec![0x30, 0x03, 0x02, 0x01, 0x01, 0x31, 0x00, 0x80, 0x00], 3),
    )]
    fn test_der_decode_encode(input: Vec<u8>, count: usize) {
        let der: Der = input.decode().unwrap();
        assert_eq!(count, der.elements().len());
        let encoded: Vec<u8> = der.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[rstest(input, expected,
        case(vec![], Error::Empty),
        case(vec![0x05, 0x00, 0x02], Error::Truncated { needed: 1, remaining: 0 }),
        case(vec![0x05, 0x00, 0x00, 0x00], Error::UnexpectedEndOfContents),
    )]
    fn test_der_decode_error(input: Vec<u8>, expected: Error) {
        let result: Result<Der> = input.as_slice().decode();
        assert_eq!(Err(expected), result);
    }

    #[rstest]
    fn test_der_reencodes_indefinite_as_definite() {
        let input = vec![0x30, 0x80, 0x02, 0x01, 0x07, 0x00, 0x00];
        let der = Der::parse(&input).unwrap();
        assert_eq!(vec![0x30, 0x03, 0x02, 0x01, 0x07], der.to_bytes());
        assert_eq!(
            Err(Error::IndefiniteLengthNotAllowed),
            Der::parse_with(&input, &ParseOptions::der())
        );
    }

    #[rstest]
    fn test_tag_serialize() {
        let tag = Tag::universal(universal::SEQUENCE, true);
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(r#"{"class":"Universal","number":16,"constructed":true}"#, json);
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, back);
    }
}
