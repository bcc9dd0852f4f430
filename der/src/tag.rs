//! Tag identity: class, number and the constructed bit.
//!
//! Identifier octets follow X.690 Section 8.1.2:
//! - Bits 8-7: class
//! - Bit 6: primitive (0) or constructed (1)
//! - Bits 5-1: tag number (0-30), or `0b11111` followed by base-128 groups

use std::fmt::{self, Display, Formatter};

use nom::number::be_u8;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const TAG_CLASS_MASK: u8 = 0xC0;
pub const TAG_CONSTRUCTED: u8 = 0x20;
pub const TAG_NUMBER_MASK: u8 = 0x1F;

/// Largest tag number that fits in the single identifier octet.
pub const MAX_SHORT_TAG_NUMBER: u32 = 30;

/// Universal tag numbers (X.680 Section 8.4).
pub mod universal {
    pub const END_OF_CONTENTS: u32 = 0;
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const ENUMERATED: u32 = 10;
    pub const UTF8_STRING: u32 = 12;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const TELETEX_STRING: u32 = 20;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const VISIBLE_STRING: u32 = 26;
    pub const UNIVERSAL_STRING: u32 = 28;
    pub const BMP_STRING: u32 = 30;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    fn bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        }
    }

    fn from_bits(octet: u8) -> Self {
        match octet & TAG_CLASS_MASK {
            0x00 => TagClass::Universal,
            0x40 => TagClass::Application,
            0x80 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

impl Display for TagClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TagClass::Universal => write!(f, "UNIVERSAL"),
            TagClass::Application => write!(f, "APPLICATION"),
            TagClass::ContextSpecific => write!(f, "CONTEXT"),
            TagClass::Private => write!(f, "PRIVATE"),
        }
    }
}

/// The (class, number, constructed) triple identifying an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    class: TagClass,
    number: u32,
    constructed: bool,
}

impl Tag {
    pub const fn new(class: TagClass, number: u32, constructed: bool) -> Self {
        Tag {
            class,
            number,
            constructed,
        }
    }

    pub const fn universal(number: u32, constructed: bool) -> Self {
        Tag::new(TagClass::Universal, number, constructed)
    }

    pub const fn context_specific(number: u32, constructed: bool) -> Self {
        Tag::new(TagClass::ContextSpecific, number, constructed)
    }

    pub const fn end_of_contents() -> Self {
        Tag::universal(universal::END_OF_CONTENTS, false)
    }

    pub fn class(&self) -> TagClass {
        self.class
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn is_universal(&self) -> bool {
        self.class == TagClass::Universal
    }

    pub fn is_end_of_contents(&self) -> bool {
        *self == Tag::end_of_contents()
    }

    /// Returns the same class and number with the given constructed bit.
    pub fn with_constructed(self, constructed: bool) -> Self {
        Tag { constructed, ..self }
    }

    /// Compares class and number, ignoring the constructed bit.
    pub fn same_identity(&self, other: &Tag) -> bool {
        self.class == other.class && self.number == other.number
    }

    /// Number of identifier octets this tag occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        if self.number <= MAX_SHORT_TAG_NUMBER {
            1
        } else {
            1 + base128_len(self.number)
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => write!(f, "[UNIVERSAL {}]", self.number)?,
            TagClass::ContextSpecific => write!(f, "[{}]", self.number)?,
            class => write!(f, "[{} {}]", class, self.number)?,
        }
        if self.constructed {
            write!(f, " constructed")?;
        }
        Ok(())
    }
}

fn base128_len(mut n: u32) -> usize {
    let mut len = 1;
    while n >= 0x80 {
        n >>= 7;
        len += 1;
    }
    len
}

/// Encodes the identifier octets of `tag`.
pub fn encode_tag(tag: &Tag) -> Vec<u8> {
    let mut out = Vec::with_capacity(tag.encoded_len());
    encode_tag_into(tag, &mut out);
    out
}

pub(crate) fn encode_tag_into(tag: &Tag, out: &mut Vec<u8>) {
    let mut first = tag.class.bits();
    if tag.constructed {
        first |= TAG_CONSTRUCTED;
    }

    if tag.number <= MAX_SHORT_TAG_NUMBER {
        out.push(first | tag.number as u8);
        return;
    }

    out.push(first | TAG_NUMBER_MASK);
    let groups = base128_len(tag.number);
    for i in (0..groups).rev() {
        let group = ((tag.number >> (7 * i)) & 0x7F) as u8;
        if i == 0 {
            out.push(group);
        } else {
            out.push(group | 0x80);
        }
    }
}

/// nom parser for the identifier octets.
///
/// Long-form numbers that would fit in the single octet are accepted as BER
/// allows; the parser rejects them only in DER mode.
pub fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag, Error> {
    let (mut input, first) = be_u8().parse(input)?;

    let class = TagClass::from_bits(first);
    let constructed = first & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
    let low = first & TAG_NUMBER_MASK;
    if low != TAG_NUMBER_MASK {
        return Ok((input, Tag::new(class, low as u32, constructed)));
    }

    // long form: base-128 groups, high bit set on all but the last
    let mut number: u32 = 0;
    let mut groups = 0;
    loop {
        let (rest, b) = be_u8().parse(input).map_err(|_: nom::Err<Error>| {
            nom::Err::Failure(Error::Truncated {
                needed: groups + 1,
                remaining: groups,
            })
        })?;
        if groups == 0 && b == 0x80 {
            return Err(nom::Err::Failure(Error::TagNumberNotMinimal));
        }
        if number > (u32::MAX >> 7) {
            return Err(nom::Err::Failure(Error::TagNumberOverflow));
        }
        number = (number << 7) | (b & 0x7F) as u32;
        groups += 1;
        input = rest;
        if b & 0x80 == 0 {
            return Ok((input, Tag::new(class, number, constructed)));
        }
    }
}

/// Decodes the identifier octets at the start of `input`.
///
/// Returns the tag and the number of bytes consumed.
pub fn decode_tag(input: &[u8]) -> Result<(Tag, usize)> {
    let (rest, tag) = parse_tag(input)?;
    Ok((tag, input.len() - rest.len()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x02], Tag::universal(universal::INTEGER, false)),
        case(vec![0x30, 0x01], Tag::universal(universal::SEQUENCE, true)),
        case(vec![0x31], Tag::universal(universal::SET, true)),
        case(vec![0xa0], Tag::context_specific(0, true)),
        case(vec![0x83], Tag::context_specific(3, false)),
        case(vec![0x61], Tag::new(TagClass::Application, 1, true)),
        case(vec![0xc2], Tag::new(TagClass::Private, 2, false)),
        case(vec![0x1e], Tag::universal(universal::BMP_STRING, false)),
        case(vec![0x9f, 0x1f], Tag::context_specific(31, false)),
        case(vec![0xbf, 0x81, 0x00], Tag::context_specific(128, true)),
        case(vec![0x5f, 0x87, 0xff, 0x7f], Tag::new(TagClass::Application, 0x1ffff, false)),
    )]
    fn test_decode_tag(input: Vec<u8>, expected: Tag) {
        let (tag, consumed) = decode_tag(&input).unwrap();
        assert_eq!(expected, tag);
        assert_eq!(expected.encoded_len(), consumed);
    }

    #[rstest(tag, expected,
        case(Tag::universal(universal::INTEGER, false), vec![0x02]),
        case(Tag::universal(universal::SEQUENCE, true), vec![0x30]),
        case(Tag::context_specific(30, false), vec![0x9e]),
        case(Tag::context_specific(31, false), vec![0x9f, 0x1f]),
        case(Tag::context_specific(127, true), vec![0xbf, 0x7f]),
        case(Tag::context_specific(128, true), vec![0xbf, 0x81, 0x00]),
        case(Tag::new(TagClass::Private, u32::MAX, false), vec![0xdf, 0x8f, 0xff, 0xff, 0xff, 0x7f]),
    )]
    fn test_encode_tag(tag: Tag, expected: Vec<u8>) {
        assert_eq!(expected, encode_tag(&tag));
        let (decoded, _) = decode_tag(&expected).unwrap();
        assert_eq!(tag, decoded);
    }

    #[rstest(input, expected,
        case(vec![], Error::Truncated { needed: 1, remaining: 0 }),
        case(vec![0x1f], Error::Truncated { needed: 1, remaining: 0 }),
        case(vec![0x1f, 0x81, 0x82], Error::Truncated { needed: 3, remaining: 2 }),
        case(vec![0x1f, 0x80, 0x01], Error::TagNumberNotMinimal),
        case(vec![0x1f, 0x9f, 0xff, 0xff, 0xff, 0x7f], Error::TagNumberOverflow),
    )]
    fn test_decode_tag_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), decode_tag(&input));
    }

    #[rstest]
    fn test_decode_tag_long_form_low_number() {
        // BER allows the long form for numbers up to 30
        let (tag, consumed) = decode_tag(&[0x1f, 0x02]).unwrap();
        assert_eq!(Tag::universal(universal::INTEGER, false), tag);
        assert_eq!(2, consumed);
        assert_eq!(1, tag.encoded_len());
    }

    #[rstest]
    fn test_tag_display() {
        assert_eq!("[2]", Tag::context_specific(2, false).to_string());
        assert_eq!("[UNIVERSAL 16] constructed", Tag::universal(universal::SEQUENCE, true).to_string());
        assert_eq!("[APPLICATION 1]", Tag::new(TagClass::Application, 1, false).to_string());
    }
}
