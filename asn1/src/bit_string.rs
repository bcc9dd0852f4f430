use std::fmt::Display;

use kumiki_der::tag::universal;
use serde::{Deserialize, Serialize};

use crate::Element;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        if serializer.is_human_readable() {
            let mut state = serializer.serialize_struct("BitString", 2)?;
            state.serialize_field("bit_length", &self.bit_len())?;

            // Convert to hex string with colon separators
            let hex_string = self
                .data
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":");
            state.serialize_field("bits", &hex_string)?;

            state.end()
        } else {
            (self.unused, &self.data).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            Err(serde::de::Error::custom(
                "BitString deserialization from a human readable format is not supported",
            ))
        } else {
            let (unused, data) = <(u8, Vec<u8>)>::deserialize(deserializer)?;
            BitString::new(unused, data).map_err(serde::de::Error::custom)
        }
    }
}

impl BitString {
    /// Creates a BitString, checking the unused-bit count against the data.
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self> {
        if unused > 7 {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        if data.is_empty() && unused != 0 {
            return Err(Error::BitStringUnusedBitsWithoutData(unused));
        }
        Ok(BitString { unused, data })
    }

    /// A BitString made of whole bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        BitString { unused: 0, data }
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    /// Returns a reference to the underlying byte data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the BitString and returns the underlying byte data
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the total number of bits (excluding unused bits)
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - self.unused as usize
    }

    /// Returns bit `index`, counting from the most significant bit of the
    /// first byte, or `None` past the end.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len() {
            return None;
        }
        let byte = self.data[index / 8];
        Some(byte & (0x80 >> (index % 8)) != 0)
    }

    /// Content octets: the unused-bit count followed by the data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.data.len() + 1);
        result.push(self.unused);
        result.extend_from_slice(&self.data);
        result
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        match value.split_first() {
            Some((&unused, data)) => BitString::new(unused, data.to_vec()),
            None => Err(Error::BitStringNoData),
        }
    }
}

impl From<BitString> for Vec<u8> {
    fn from(value: BitString) -> Self {
        value.to_bytes()
    }
}

impl TryFrom<&Element> for BitString {
    type Error = Error;

    /// Accepts the primitive form and the BER constructed form, whose
    /// segments are concatenated.
    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::BitString(bs) => Ok(bs.clone()),
            Element::Constructed { tag, elements }
                if tag.is_universal() && tag.number() == universal::BIT_STRING =>
            {
                let mut data = Vec::new();
                let mut unused = 0;
                for (i, segment) in elements.iter().enumerate() {
                    let segment = BitString::try_from(segment)?;
                    if segment.unused != 0 && i + 1 != elements.len() {
                        return Err(Error::BitStringSegmentUnusedBits);
                    }
                    unused = segment.unused;
                    data.extend(segment.data);
                }
                BitString::new(unused, data)
            }
            other => Err(other.unexpected("BIT STRING")),
        }
    }
}

impl From<BitString> for Element {
    fn from(value: BitString) -> Self {
        Element::BitString(value)
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut result = String::new();

        for (i, byte) in self.data.iter().enumerate() {
            if i == self.data.len() - 1 && self.unused > 0 {
                // Handle the last byte with unused bits
                let valid_bits = byte >> self.unused;
                let bit_count = 8 - self.unused as usize;
                result.push_str(&format!(
                    "{:0bit_count$b}",
                    valid_bits,
                    bit_count = bit_count
                ));
            } else {
                result.push_str(&format!("{:08b}", byte));
            }
        }

        write!(f, "{}", result)
    }
}
