use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Element;
use crate::error::{Error, Result};

/// An OBJECT IDENTIFIER as its list of arcs.
///
/// Every constructor checks the X.660 arc rules, so a value of this type
/// always has a valid encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn new(components: Vec<u64>) -> Result<Self> {
        validate(&components)?;
        Ok(ObjectIdentifier { inner: components })
    }

    pub fn components(&self) -> &[u64] {
        &self.inner
    }

    /// Content octets: the first two arcs folded into one base-128 value,
    /// followed by every remaining arc.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.inner.len() + 4);
        // validated on construction: cannot overflow
        push_base128(&mut result, self.inner[0] * 40 + self.inner[1]);
        for v in &self.inner[2..] {
            push_base128(&mut result, *v);
        }
        result
    }
}

fn validate(components: &[u64]) -> Result<()> {
    let (first, second) = match components {
        [first, second, ..] => (*first, *second),
        _ => return Err(Error::ObjectIdentifierTooFewComponents),
    };
    match first {
        0 | 1 if second >= 40 => Err(Error::ObjectIdentifierInvalidSecondComponent { first, second }),
        0 | 1 => Ok(()),
        2 if second > u64::MAX - 80 => Err(Error::ObjectIdentifierComponentOverflow),
        2 => Ok(()),
        _ => Err(Error::ObjectIdentifierInvalidFirstComponent(first)),
    }
}

fn push_base128(out: &mut Vec<u8>, value: u64) {
    let groups = ((u64::BITS - value.leading_zeros()).max(1)).div_ceil(7);
    for i in (0..groups).rev() {
        let group = ((value >> (7 * i)) & 0x7F) as u8;
        // If this is not the last byte, set the continuation bit
        if i == 0 {
            out.push(group);
        } else {
            out.push(group | 0x80);
        }
    }
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut values = Vec::new();
        let mut val = 0u64;
        let mut in_group = false;
        for &b in value {
            if !in_group && b == 0x80 {
                return Err(Error::ObjectIdentifierNotMinimal);
            }
            if val > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierComponentOverflow);
            }
            val = (val << 7) | (b & 0x7F) as u64;
            if b & 0x80 == 0 {
                // If the continuation bit is not set, we have reached the end of this value
                values.push(val);
                val = 0;
                in_group = false;
            } else {
                in_group = true;
            }
        }
        if in_group {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // X.690 8.19.4: the first value folds two arcs; arc 2 takes the rest
        let first = values[0];
        let (c0, c1) = match first {
            0..=39 => (0, first),
            40..=79 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut inner = Vec::with_capacity(values.len() + 1);
        inner.push(c0);
        inner.push(c1);
        inner.extend_from_slice(&values[1..]);

        Ok(ObjectIdentifier { inner })
    }
}

impl TryFrom<Vec<u8>> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> Result<Self> {
        Self::try_from(value.as_slice())
    }
}

impl From<&ObjectIdentifier> for Vec<u8> {
    fn from(oid: &ObjectIdentifier) -> Self {
        oid.to_bytes()
    }
}

impl TryFrom<&Element> for ObjectIdentifier {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::ObjectIdentifier(oid) => Ok(oid.clone()),
            other => Err(other.unexpected("OBJECT IDENTIFIER")),
        }
    }
}

impl From<ObjectIdentifier> for Element {
    fn from(value: ObjectIdentifier) -> Self {
        Element::ObjectIdentifier(value)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, n) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::ObjectIdentifierEmptyString);
        }
        let values = s
            .split('.')
            .map(|component| {
                component
                    .parse::<u64>()
                    .map_err(|source| Error::ObjectIdentifierInvalidComponent {
                        component: component.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<u64>>>()?;
        ObjectIdentifier::new(values)
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        *self == other.to_string()
    }
}
