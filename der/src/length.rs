//! Length octets (X.690 Section 8.1.3).

use nom::bytes::complete::take;
use nom::number::be_u8;
use nom::{IResult, Parser};

use crate::error::{Error, Result};

const LONG_FORM: u8 = 0x80;
const INDEFINITE: u8 = 0x80;
const RESERVED: u8 = 0xFF;

/// Length of a value's contents as read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Content length known up front.
    Definite(usize),
    /// Content terminated by an end-of-contents marker (BER only).
    Indefinite,
}

impl Length {
    pub fn is_indefinite(&self) -> bool {
        matches!(self, Length::Indefinite)
    }
}

/// Number of length octets `len` occupies in definite form.
pub fn length_octets_len(len: usize) -> usize {
    if len < LONG_FORM as usize {
        1
    } else {
        1 + significant_bytes(len)
    }
}

fn significant_bytes(len: usize) -> usize {
    (usize::BITS as usize - len.leading_zeros() as usize).div_ceil(8)
}

/// Encodes a definite length, using the short form when it fits.
pub fn encode_length(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(length_octets_len(len));
    encode_length_into(len, &mut out);
    out
}

pub(crate) fn encode_length_into(len: usize, out: &mut Vec<u8>) {
    if len < LONG_FORM as usize {
        // short form: 0-127
        out.push(len as u8);
        return;
    }
    let n = significant_bytes(len);
    out.push(LONG_FORM | n as u8);
    out.extend_from_slice(&len.to_be_bytes()[size_of::<usize>() - n..]);
}

/// nom parser for the length octets.
///
/// Long forms with leading zero octets are accepted as BER allows; the
/// parser rejects them only in DER mode.
pub fn parse_length(input: &[u8]) -> IResult<&[u8], Length, Error> {
    let (input, n) = be_u8().parse(input)?;

    if n & LONG_FORM == 0 {
        return Ok((input, Length::Definite(n as usize)));
    }
    if n == INDEFINITE {
        return Ok((input, Length::Indefinite));
    }
    if n == RESERVED {
        return Err(nom::Err::Failure(Error::ReservedLength));
    }

    // long form
    // The low 7 bits count the big-endian length bytes that follow.
    let count = (n & 0x7f) as usize;
    let (rest, bs) = take(count).parse(input).map_err(|_: nom::Err<Error>| {
        nom::Err::Failure(Error::Truncated {
            needed: count,
            remaining: input.len(),
        })
    })?;

    let significant = bs.iter().skip_while(|&&b| b == 0).count();
    if significant > size_of::<usize>() {
        return Err(nom::Err::Failure(Error::LengthOverflow(count)));
    }
    let len = bs.iter().fold(0usize, |len, &b| (len << 8) | b as usize);

    Ok((rest, Length::Definite(len)))
}

/// Decodes the length octets at the start of `input`.
///
/// Returns the length and the number of bytes consumed.
pub fn decode_length(input: &[u8]) -> Result<(Length, usize)> {
    let (rest, length) = parse_length(input)?;
    Ok((length, input.len() - rest.len()))
}

/// Whether `consumed` length octets are the shortest encoding of `length`.
pub fn is_minimal_length(length: Length, consumed: usize) -> bool {
    match length {
        Length::Definite(len) => consumed == length_octets_len(len),
        Length::Indefinite => consumed == 1,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected, consumed,
        case(vec![0x00], Length::Definite(0), 1),
        case(vec![0x02, 0x01], Length::Definite(2), 1),
        case(vec![0x7f], Length::Definite(127), 1),
        case(vec![0x80], Length::Indefinite, 1),
        case(vec![0x81, 0x80], Length::Definite(128), 2),
        case(vec![0x82, 0x02, 0x10], Length::Definite(256 * 0x02 + 0x10), 3),
        case(vec![0x83, 0x01, 0x00, 0x00], Length::Definite(256 * 256), 4),
        case(vec![0x82, 0xff, 0xff], Length::Definite(256 * 0xff + 0xff), 3),
        case(vec![0x82, 0x00, 0x05], Length::Definite(5), 3),
    )]
    fn test_decode_length(input: Vec<u8>, expected: Length, consumed: usize) {
        let actual = decode_length(&input).unwrap();
        assert_eq!((expected, consumed), actual);
    }

    #[rstest(input, expected,
        case(vec![], Error::Truncated { needed: 1, remaining: 0 }),
        case(vec![0x82, 0x01], Error::Truncated { needed: 2, remaining: 1 }),
        case(vec![0xff], Error::ReservedLength),
        case(vec![0x89, 0x01, 0, 0, 0, 0, 0, 0, 0, 0], Error::LengthOverflow(9)),
    )]
    fn test_decode_length_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), decode_length(&input));
    }

    #[rstest(len, expected,
        case(0, vec![0x00]),
        case(127, vec![0x7f]),
        case(128, vec![0x81, 0x80]),
        case(255, vec![0x81, 0xff]),
        case(256, vec![0x82, 0x01, 0x00]),
        case(0x010000, vec![0x83, 0x01, 0x00, 0x00]),
    )]
    fn test_encode_length(len: usize, expected: Vec<u8>) {
        assert_eq!(expected, encode_length(len));
        assert_eq!(expected.len(), length_octets_len(len));
        assert_eq!(Ok((Length::Definite(len), expected.len())), decode_length(&expected));
    }

    #[rstest(input, minimal,
        case(vec![0x05], true),
        case(vec![0x81, 0x80], true),
        case(vec![0x80], true),
        case(vec![0x81, 0x05], false),
        case(vec![0x82, 0x00, 0x80], false),
        case(vec![0x82, 0x00, 0x00], false),
    )]
    fn test_is_minimal_length(input: Vec<u8>, minimal: bool) {
        let (length, consumed) = decode_length(&input).unwrap();
        assert_eq!(minimal, is_minimal_length(length, consumed));
    }

    #[rstest]
    fn test_parse_length_leaves_rest() {
        let input = [0x82, 0x01, 0x00, 0xaa, 0xbb];
        let (rest, length) = parse_length(&input).unwrap();
        assert_eq!(Length::Definite(256), length);
        assert_eq!(&[0xaa, 0xbb], rest);
    }
}
