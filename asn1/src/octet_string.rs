use std::fmt::Display;

use kumiki_der::ParseOptions;
use kumiki_der::tag::universal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{ASN1Object, Element};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl Serialize for OctetString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            let hex_string = self
                .inner
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>();
            serializer.serialize_str(&hex_string)
        } else {
            self.inner.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for OctetString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_string = String::deserialize(deserializer)?;
            // Remove any whitespace or common separators
            let cleaned =
                hex_string.replace(|c: char| c.is_whitespace() || c == ':' || c == '-', "");
            if cleaned.len() % 2 != 0 {
                return Err(serde::de::Error::custom("hex string must have even length"));
            }
            let inner = (0..cleaned.len())
                .step_by(2)
                .map(|i| {
                    cleaned
                        .get(i..i + 2)
                        .and_then(|byte| u8::from_str_radix(byte, 16).ok())
                        .ok_or_else(|| serde::de::Error::custom("invalid hex string"))
                })
                .collect::<std::result::Result<Vec<u8>, D::Error>>()?;
            Ok(OctetString { inner })
        } else {
            let inner = Vec::<u8>::deserialize(deserializer)?;
            Ok(OctetString { inner })
        }
    }
}

impl OctetString {
    /// Returns the inner bytes as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Consumes self and returns the inner bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Decodes the content as exactly one encapsulated element, as used by
    /// extension values and CMS encapsulated content.
    pub fn decode_inner(&self) -> Result<Element> {
        self.decode_inner_with(&ParseOptions::default())
    }

    pub fn decode_inner_with(&self, options: &ParseOptions) -> Result<Element> {
        let tlv = kumiki_der::parse_single(&self.inner, options)?;
        Element::try_from(&tlv)
    }
}

impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self> {
        let der = kumiki_der::Der::parse(value.as_bytes())?;
        ASN1Object::try_from(&der)
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl TryFrom<&Element> for OctetString {
    type Error = Error;

    /// Accepts the primitive form and the BER constructed form, whose
    /// segments are concatenated.
    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::OctetString(os) => Ok(os.clone()),
            Element::Constructed { tag, elements }
                if tag.is_universal() && tag.number() == universal::OCTET_STRING =>
            {
                let mut inner = Vec::new();
                for segment in elements {
                    inner.extend(OctetString::try_from(segment)?.inner);
                }
                Ok(OctetString { inner })
            }
            other => Err(other.unexpected("OCTET STRING")),
        }
    }
}

impl From<OctetString> for Element {
    fn from(value: OctetString) -> Self {
        Element::OctetString(value)
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.inner {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
