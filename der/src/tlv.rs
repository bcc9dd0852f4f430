use crate::length::{encode_length_into, length_octets_len};
use crate::tag::{Tag, encode_tag_into};

/// One encoded value: a tag and either raw content or nested values.
///
/// The constructed bit of the tag always agrees with the kind of value held.
/// Encoding is always definite-length DER, whatever form the value was read
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlvs(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag: tag.with_constructed(false),
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag: tag.with_constructed(true),
            value: Value::Tlvs(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self.value, Value::Tlvs(_))
    }

    /// Raw content of a primitive value.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlvs(_) => None,
        }
    }

    /// Children of a constructed value.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlvs(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    /// Returns the same value under a different tag, keeping the
    /// constructed bit consistent with the content.
    pub fn retag(self, tag: Tag) -> Self {
        let constructed = self.is_constructed();
        Tlv {
            tag: tag.with_constructed(constructed),
            value: self.value,
        }
    }

    /// Length of the content octets in definite form.
    pub fn content_len(&self) -> usize {
        match &self.value {
            Value::Data(data) => data.len(),
            Value::Tlvs(tlvs) => tlvs.iter().map(Tlv::encoded_len).sum(),
        }
    }

    /// Length of the full encoding: identifier, length and content octets.
    pub fn encoded_len(&self) -> usize {
        let content_len = self.content_len();
        self.tag.encoded_len() + length_octets_len(content_len) + content_len
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    /// Appends the DER encoding of this value to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        encode_tag_into(&self.tag, out);
        encode_length_into(self.content_len(), out);
        match &self.value {
            Value::Data(data) => out.extend_from_slice(data),
            Value::Tlvs(tlvs) => {
                for tlv in tlvs {
                    tlv.encode_into(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::tag::{TagClass, universal};

    fn integer(n: u8) -> Tlv {
        Tlv::new_primitive(Tag::universal(universal::INTEGER, false), vec![n])
    }

    #[rstest(tlv, expected,
        case(Tlv::new_primitive(Tag::universal(universal::NULL, false), vec![]), vec![0x05, 0x00]),
        case(integer(7), vec![0x02, 0x01, 0x07]),
        case(
            Tlv::new_constructed(Tag::universal(universal::SEQUENCE, true), vec![integer(7), integer(8), integer(9)]),
            vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09]
        ),
        case(
            Tlv::new_constructed(Tag::context_specific(0, true), vec![integer(2)]),
            vec![0xa0, 0x03, 0x02, 0x01, 0x02]
        ),
        case(
            Tlv::new_primitive(Tag::new(TagClass::ContextSpecific, 31, false), vec![0xaa]),
            vec![0x9f, 0x1f, 0x01, 0xaa]
        ),
        case(
            Tlv::new_constructed(Tag::universal(universal::SET, true), vec![]),
            vec![0x31, 0x00]
        ),
    )]
    fn test_encode(tlv: Tlv, expected: Vec<u8>) {
        assert_eq!(expected, tlv.encode());
        assert_eq!(expected.len(), tlv.encoded_len());
    }

    #[rstest]
    fn test_encode_long_length() {
        let tlv = Tlv::new_primitive(Tag::universal(universal::OCTET_STRING, false), vec![0xab; 300]);
        let encoded = tlv.encode();
        assert_eq!(&[0x04, 0x82, 0x01, 0x2c], &encoded[..4]);
        assert_eq!(304, encoded.len());
        assert_eq!(304, tlv.encoded_len());
    }

    #[rstest]
    fn test_constructor_fixes_constructed_bit() {
        let primitive = Tlv::new_primitive(Tag::universal(universal::INTEGER, true), vec![0x01]);
        assert!(!primitive.tag().is_constructed());
        assert!(!primitive.is_constructed());

        let constructed = Tlv::new_constructed(Tag::context_specific(1, false), vec![]);
        assert!(constructed.tag().is_constructed());
        assert!(constructed.is_constructed());
    }

    #[rstest]
    fn test_retag_keeps_content() {
        let tlv = integer(5).retag(Tag::context_specific(3, true));
        assert_eq!(&Tag::context_specific(3, false), tlv.tag());
        assert_eq!(Some(&[0x05][..]), tlv.data());
        assert_eq!(vec![0x83, 0x01, 0x05], tlv.encode());
    }
}
