use std::fmt::Display;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Element;
use crate::error::{Error, Result};

// ASN.1 INTEGER (and ENUMERATED) values are arbitrary-precision signed
// numbers. Narrowing to a native type is explicit and checked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn new(inner: BigInt) -> Self {
        Integer { inner }
    }

    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn into_bigint(self) -> BigInt {
        self.inner
    }

    /// Minimal two's-complement big-endian content octets.
    ///
    /// Zero encodes as a single `0x00`; a leading `0x00` is kept when the
    /// high bit of a positive value would otherwise read as a sign.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }

    /// Converts the Integer to u32 if it fits in the range
    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    /// Converts the Integer to i32 if it fits in the range
    pub fn to_i32(&self) -> Option<i32> {
        self.inner.to_i32()
    }

    /// Converts the Integer to i64 if it fits in the range
    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    /// Converts the Integer to u64 if it fits in the range
    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl TryFrom<&[u8]> for Integer {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::IntegerNoData);
        }
        Ok(Integer {
            inner: BigInt::from_signed_bytes_be(value),
        })
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

macro_rules! impl_from_native {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(value: $t) -> Self {
                    Integer { inner: BigInt::from(value) }
                }
            }
        )*
    };
}

impl_from_native!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.to_i64().ok_or(Error::IntegerOutOfRange("i64"))
    }
}

impl TryFrom<Integer> for i64 {
    type Error = Error;

    fn try_from(value: Integer) -> Result<Self> {
        i64::try_from(&value)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.to_u64().ok_or(Error::IntegerOutOfRange("u64"))
    }
}

impl TryFrom<Integer> for u64 {
    type Error = Error;

    fn try_from(value: Integer) -> Result<Self> {
        u64::try_from(&value)
    }
}

impl TryFrom<&Element> for Integer {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::Integer(i) => Ok(i.clone()),
            other => Err(other.unexpected("INTEGER")),
        }
    }
}

impl From<Integer> for Element {
    fn from(value: Integer) -> Self {
        Element::Integer(value)
    }
}

/// The value of an ENUMERATED element. Shares the INTEGER content encoding
/// but keeps its own tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Enumerated(Integer);

impl Enumerated {
    pub fn value(&self) -> &Integer {
        &self.0
    }

    pub fn into_integer(self) -> Integer {
        self.0
    }
}

impl From<Integer> for Enumerated {
    fn from(value: Integer) -> Self {
        Enumerated(value)
    }
}

impl TryFrom<&Element> for Enumerated {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::Enumerated(i) => Ok(Enumerated(i.clone())),
            other => Err(other.unexpected("ENUMERATED")),
        }
    }
}

impl From<Enumerated> for Element {
    fn from(value: Enumerated) -> Self {
        Element::Enumerated(value.0)
    }
}

impl FromStr for Integer {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Integer { inner: s.parse()? })
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use num_bigint::BigInt;
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0x00], "0"),
        case(vec![0xff], "-1"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0xff, 0x7f], "-129"),
        case(vec![0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], "-9223372036854775808"),
        case(vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], "18446744073709551615"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249"),
    )]
    fn test_integer_from_bytes(input: Vec<u8>, expected: &str) {
        let value = Integer::try_from(input.as_slice()).unwrap();
        assert_eq!(Integer::from_str(expected).unwrap(), value);
        assert_eq!(input, value.to_bytes());
    }

    #[rstest]
    fn test_integer_from_empty_bytes() {
        assert!(matches!(
            Integer::try_from(&[][..]),
            Err(Error::IntegerNoData)
        ));
    }

    #[rstest(value, expected,
        case(Integer::from(0), vec![0x00]),
        case(Integer::from(127), vec![0x7f]),
        case(Integer::from(128), vec![0x00, 0x80]),
        case(Integer::from(255), vec![0x00, 0xff]),
        case(Integer::from(256), vec![0x01, 0x00]),
        case(Integer::from(-1), vec![0xff]),
        case(Integer::from(-128), vec![0x80]),
        case(Integer::from(-129), vec![0xff, 0x7f]),
        case(Integer::from(u64::MAX), vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
    )]
    fn test_integer_to_bytes(value: Integer, expected: Vec<u8>) {
        assert_eq!(expected, value.to_bytes());
    }

    #[rstest]
    fn test_integer_narrowing() {
        let big = Integer::from(u64::MAX);
        assert_eq!(Some(u64::MAX), big.to_u64());
        assert_eq!(None, big.to_i64());
        assert!(matches!(i64::try_from(&big), Err(Error::IntegerOutOfRange("i64"))));

        let negative = Integer::from(-5);
        assert_eq!(Some(-5), negative.to_i32());
        assert!(u64::try_from(negative).is_err());

        let huge = Integer::from_str("340282366920938463463374607431768211456").unwrap();
        assert_eq!(None, huge.to_u64());
        assert_eq!(&BigInt::from(u128::MAX) + 1, *huge.as_bigint());
    }

    #[rstest]
    fn test_enumerated_from_element() {
        let element = Element::Enumerated(Integer::from(3));
        let enumerated = Enumerated::try_from(&element).unwrap();
        assert_eq!(Some(3), enumerated.value().to_u32());
        assert_eq!(element, Element::from(enumerated));

        // INTEGER and ENUMERATED are distinct types
        assert!(matches!(
            Enumerated::try_from(&Element::Integer(Integer::from(3))),
            Err(Error::UnexpectedElement { expected: "ENUMERATED", actual: "INTEGER" })
        ));
        assert!(matches!(
            Integer::try_from(&element),
            Err(Error::UnexpectedElement { expected: "INTEGER", actual: "ENUMERATED" })
        ));
    }

    #[rstest(
        input,
        expected_json,
        case(Integer::from(0), r#""0""#),
        case(Integer::from(255), r#""255""#),
        case(Integer::from(-1), r#""-1""#),
        case(Integer::from_str("333504890676592408951587385614406537514249").unwrap(), r#""333504890676592408951587385614406537514249""#)
    )]
    fn test_integer_serialize(input: Integer, expected_json: &str) {
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(expected_json, json);
        let back: Integer = serde_json::from_str(&json).unwrap();
        assert_eq!(input, back);
    }
}
