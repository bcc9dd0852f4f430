//! Character string codecs.
//!
//! Every string type is held as a Rust `String` inside [`Element`]; the
//! functions here convert between that view and the content octets of each
//! universal string type.

use crate::Element;
use crate::error::{Error, Result};

const PRINTABLE_PUNCTUATION: &str = " '()+,-./:=?";

fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric() || PRINTABLE_PUNCTUATION.contains(c)
}

fn is_numeric(c: char) -> bool {
    c.is_ascii_digit() || c == ' '
}

fn is_visible(c: char) -> bool {
    matches!(c, ' '..='~')
}

pub fn decode_utf8(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec()).map_err(|_| Error::Utf8StringInvalidUtf8)
}

pub fn decode_numeric(data: &[u8]) -> Result<String> {
    data.iter()
        .map(|&b| {
            let c = char::from(b);
            if is_numeric(c) {
                Ok(c)
            } else {
                Err(Error::NumericStringInvalidCharacter(c))
            }
        })
        .collect()
}

pub fn encode_numeric(s: &str) -> Result<Vec<u8>> {
    match s.chars().find(|c| !is_numeric(*c)) {
        Some(c) => Err(Error::NumericStringInvalidCharacter(c)),
        None => Ok(s.as_bytes().to_vec()),
    }
}

/// Reads any 7-bit content. Deployed certificates carry characters such as
/// `*` and `@` in PrintableString fields, so the X.680 character set is only
/// checked by [`validate_printable`].
pub fn decode_printable(data: &[u8]) -> Result<String> {
    if !data.is_ascii() {
        return Err(Error::PrintableStringInvalidEncoding);
    }
    Ok(data.iter().map(|&b| char::from(b)).collect())
}

/// Accepts exactly what [`decode_printable`] produces, so decoded values
/// always re-encode.
pub fn encode_printable(s: &str) -> Result<Vec<u8>> {
    match s.chars().find(|c| !c.is_ascii()) {
        Some(c) => Err(Error::PrintableStringInvalidCharacter(c)),
        None => Ok(s.as_bytes().to_vec()),
    }
}

/// Checks `s` against the PrintableString character set.
pub fn validate_printable(s: &str) -> Result<()> {
    match s.chars().find(|c| !is_printable(*c)) {
        Some(c) => Err(Error::PrintableStringInvalidCharacter(c)),
        None => Ok(()),
    }
}

/// Maps each byte to the code point of the same value (Latin-1).
pub fn decode_teletex(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

pub fn encode_teletex(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::TeletexStringUnrepresentable(c)))
        .collect()
}

pub fn decode_ia5(data: &[u8]) -> Result<String> {
    if !data.is_ascii() {
        return Err(Error::Ia5StringInvalidEncoding);
    }
    Ok(data.iter().map(|&b| char::from(b)).collect())
}

pub fn encode_ia5(s: &str) -> Result<Vec<u8>> {
    match s.chars().find(|c| !c.is_ascii()) {
        Some(c) => Err(Error::Ia5StringInvalidCharacter(c)),
        None => Ok(s.as_bytes().to_vec()),
    }
}

pub fn decode_visible(data: &[u8]) -> Result<String> {
    data.iter()
        .map(|&b| {
            let c = char::from(b);
            if is_visible(c) {
                Ok(c)
            } else {
                Err(Error::VisibleStringInvalidCharacter(c))
            }
        })
        .collect()
}

pub fn encode_visible(s: &str) -> Result<Vec<u8>> {
    match s.chars().find(|c| !is_visible(*c)) {
        Some(c) => Err(Error::VisibleStringInvalidCharacter(c)),
        None => Ok(s.as_bytes().to_vec()),
    }
}

/// UTF-16BE, surrogate pairs included.
pub fn decode_bmp(data: &[u8]) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(Error::BmpStringOddLength(data.len()));
    }
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::BmpStringUnpairedSurrogate)
}

pub fn encode_bmp(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// UTF-32BE.
pub fn decode_universal(data: &[u8]) -> Result<String> {
    if data.len() % 4 != 0 {
        return Err(Error::UniversalStringInvalidLength(data.len()));
    }
    data.chunks_exact(4)
        .enumerate()
        .map(|(position, quad)| {
            let code_point = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
            char::from_u32(code_point)
                .ok_or(Error::UniversalStringInvalidCodePoint { position, code_point })
        })
        .collect()
}

pub fn encode_universal(s: &str) -> Vec<u8> {
    s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()
}

/// The text of any character string element.
impl TryFrom<&Element> for String {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        element
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| element.unexpected("character string"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(b"Example CA".to_vec(), "Example CA"),
        case(b"a*b@c".to_vec(), "a*b@c"),
        case(vec![], ""),
    )]
    fn test_decode_printable(input: Vec<u8>, expected: &str) {
        assert_eq!(expected, decode_printable(&input).unwrap());
    }

    #[rstest]
    fn test_printable_charset() {
        assert!(validate_printable("Tokyo (JP) 1-2/3").is_ok());
        assert!(matches!(
            validate_printable("user@example"),
            Err(Error::PrintableStringInvalidCharacter('@'))
        ));
        assert!(matches!(
            decode_printable(&[0x41, 0xc3]),
            Err(Error::PrintableStringInvalidEncoding)
        ));
    }

    #[rstest]
    fn test_encode_printable_matches_decode() {
        let decoded = decode_printable(b"a*b@c").unwrap();
        assert_eq!(b"a*b@c".to_vec(), encode_printable(&decoded).unwrap());
        assert!(matches!(
            encode_printable("caf\u{e9}"),
            Err(Error::PrintableStringInvalidCharacter('\u{e9}'))
        ));
    }

    #[rstest]
    fn test_numeric_string() {
        assert_eq!("0123 456", decode_numeric(b"0123 456").unwrap());
        assert!(matches!(
            decode_numeric(b"12a"),
            Err(Error::NumericStringInvalidCharacter('a'))
        ));
        assert!(encode_numeric("12-3").is_err());
    }

    #[rstest]
    fn test_visible_string() {
        assert_eq!("Hi there~", decode_visible(b"Hi there~").unwrap());
        assert!(matches!(
            decode_visible(b"tab\there"),
            Err(Error::VisibleStringInvalidCharacter('\t'))
        ));
        assert!(encode_visible("caf\u{e9}").is_err());
    }

    #[rstest]
    fn test_ia5_string() {
        assert_eq!("user@example.com", decode_ia5(b"user@example.com").unwrap());
        assert!(matches!(decode_ia5(&[0x80]), Err(Error::Ia5StringInvalidEncoding)));
        assert!(matches!(
            encode_ia5("\u{e9}"),
            Err(Error::Ia5StringInvalidCharacter('\u{e9}'))
        ));
    }

    #[rstest]
    fn test_teletex_string() {
        assert_eq!("Caf\u{e9}", decode_teletex(&[0x43, 0x61, 0x66, 0xe9]));
        assert_eq!(vec![0x43, 0x61, 0x66, 0xe9], encode_teletex("Caf\u{e9}").unwrap());
        assert!(matches!(
            encode_teletex("\u{20ac}"),
            Err(Error::TeletexStringUnrepresentable('\u{20ac}'))
        ));
    }

    #[rstest(input, expected,
        case(vec![0x00, 0x41, 0x00, 0x42], "AB"),
        case(vec![0x30, 0xc6, 0x30, 0xb9, 0x30, 0xc8], "\u{30c6}\u{30b9}\u{30c8}"),
        // U+1F600 as a surrogate pair
        case(vec![0xd8, 0x3d, 0xde, 0x00], "\u{1f600}"),
    )]
    fn test_bmp_string(input: Vec<u8>, expected: &str) {
        assert_eq!(expected, decode_bmp(&input).unwrap());
        assert_eq!(input, encode_bmp(expected));
    }

    #[rstest]
    fn test_bmp_string_invalid() {
        assert!(matches!(decode_bmp(&[0x00, 0x41, 0x00]), Err(Error::BmpStringOddLength(3))));
        assert!(matches!(
            decode_bmp(&[0xd8, 0x3d, 0x00, 0x41]),
            Err(Error::BmpStringUnpairedSurrogate)
        ));
    }

    #[rstest]
    fn test_universal_string() {
        let bytes = vec![0x00, 0x00, 0x00, 0x41, 0x00, 0x01, 0xf6, 0x00];
        assert_eq!("A\u{1f600}", decode_universal(&bytes).unwrap());
        assert_eq!(bytes, encode_universal("A\u{1f600}"));

        assert!(matches!(
            decode_universal(&[0x00, 0x00, 0x41]),
            Err(Error::UniversalStringInvalidLength(3))
        ));
        assert!(matches!(
            decode_universal(&[0x00, 0x00, 0x00, 0x41, 0x00, 0x00, 0xd8, 0x00]),
            Err(Error::UniversalStringInvalidCodePoint { position: 1, code_point: 0xd800 })
        ));
    }

    #[rstest]
    fn test_utf8_string() {
        assert_eq!("\u{65e5}\u{672c}", decode_utf8("\u{65e5}\u{672c}".as_bytes()).unwrap());
        assert!(matches!(decode_utf8(&[0xff, 0xfe]), Err(Error::Utf8StringInvalidUtf8)));
    }

    #[rstest]
    fn test_string_from_element() {
        let element = Element::PrintableString("JP".to_string());
        assert_eq!("JP", String::try_from(&element).unwrap());
        assert!(matches!(
            String::try_from(&Element::Null),
            Err(Error::UnexpectedElement { expected: "character string", actual: "NULL" })
        ));
    }
}
