//! # kumiki-asn1
//!
//! Typed ASN.1 values on top of the [`kumiki_der`] TLV layer.
//!
//! [`Element`] is resolved once from a [`Tlv`]: every universal type the
//! crate knows becomes a typed variant, and everything else (context-specific,
//! application and private tags, unknown universal tags, BER constructed
//! strings) is kept in the generic [`Element::Constructed`] and
//! [`Element::Primitive`] containers.
//!
//! ```
//! use kumiki_asn1::{Element, Integer};
//!
//! let (element, consumed) = Element::from_der(&[0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xff]).unwrap();
//! assert_eq!(8, consumed);
//! assert_eq!(
//!     Element::Sequence(vec![Element::Integer(Integer::from(5)), Element::Boolean(true)]),
//!     element
//! );
//! assert_eq!(vec![0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xff], element.to_der().unwrap());
//! ```

#![forbid(unsafe_code)]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use kumiki::decoder::{DecodableFrom, Decoder};
use kumiki::encoder::{EncodableTo, Encoder};
use kumiki_der::tag::universal;
use kumiki_der::{Der, ParseOptions, Tag, Tlv, Value};

pub mod bit_string;
pub mod choice;
pub mod error;
pub mod integer;
pub mod octet_string;
pub mod oid;
pub mod string;
pub mod time;

pub use bit_string::BitString;
pub use choice::{Alternative, Choice, Tagging};
pub use error::{Error, Result, ResultExt};
pub use integer::{Enumerated, Integer};
pub use octet_string::OctetString;
pub use oid::ObjectIdentifier;

/// The typed view of a [`Der`] buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

impl TryFrom<&Der> for ASN1Object {
    type Error = Error;

    fn try_from(der: &Der) -> Result<Self> {
        let elements = der
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(ASN1Object { elements })
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object> {
        ASN1Object::try_from(self)
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der> {
        let tlvs = self
            .elements
            .iter()
            .map(Tlv::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    NumericString(String),
    PrintableString(String),
    TeletexString(String),
    IA5String(String),
    VisibleString(String),
    BMPString(String),
    UniversalString(String),
    UTCTime(DateTime<Utc>),
    GeneralizedTime(DateTime<Utc>),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    /// Any constructed value without a typed variant, such as an EXPLICIT
    /// `[n]` wrapper or a BER constructed string.
    Constructed { tag: Tag, elements: Vec<Element> },
    /// Any primitive value without a typed variant, such as an IMPLICIT
    /// `[n]` field. `data` holds the raw content octets.
    Primitive { tag: Tag, data: Vec<u8> },
}

impl Element {
    /// Decodes one value from the front of `input`, returning the element and
    /// the number of bytes consumed.
    pub fn from_der(input: &[u8]) -> Result<(Element, usize)> {
        Self::from_der_with(input, &ParseOptions::default())
    }

    pub fn from_der_with(input: &[u8], options: &ParseOptions) -> Result<(Element, usize)> {
        let (tlv, consumed) = kumiki_der::parse_with(input, options)?;
        Ok((Element::try_from(&tlv)?, consumed))
    }

    /// DER encoding of this element.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(Tlv::try_from(self)?.encode())
    }

    /// The outer tag this element is encoded with.
    pub fn tag(&self) -> Tag {
        let number = match self {
            Element::Constructed { tag, .. } | Element::Primitive { tag, .. } => return *tag,
            Element::Sequence(_) => return Tag::universal(universal::SEQUENCE, true),
            Element::Set(_) => return Tag::universal(universal::SET, true),
            Element::Boolean(_) => universal::BOOLEAN,
            Element::Integer(_) => universal::INTEGER,
            Element::Enumerated(_) => universal::ENUMERATED,
            Element::BitString(_) => universal::BIT_STRING,
            Element::OctetString(_) => universal::OCTET_STRING,
            Element::Null => universal::NULL,
            Element::ObjectIdentifier(_) => universal::OBJECT_IDENTIFIER,
            Element::UTF8String(_) => universal::UTF8_STRING,
            Element::NumericString(_) => universal::NUMERIC_STRING,
            Element::PrintableString(_) => universal::PRINTABLE_STRING,
            Element::TeletexString(_) => universal::TELETEX_STRING,
            Element::IA5String(_) => universal::IA5_STRING,
            Element::VisibleString(_) => universal::VISIBLE_STRING,
            Element::BMPString(_) => universal::BMP_STRING,
            Element::UniversalString(_) => universal::UNIVERSAL_STRING,
            Element::UTCTime(_) => universal::UTC_TIME,
            Element::GeneralizedTime(_) => universal::GENERALIZED_TIME,
        };
        Tag::universal(number, false)
    }

    /// ASN.1 name of the element's type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Boolean(_) => "BOOLEAN",
            Element::Integer(_) => "INTEGER",
            Element::Enumerated(_) => "ENUMERATED",
            Element::BitString(_) => "BIT STRING",
            Element::OctetString(_) => "OCTET STRING",
            Element::Null => "NULL",
            Element::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Element::UTF8String(_) => "UTF8String",
            Element::NumericString(_) => "NumericString",
            Element::PrintableString(_) => "PrintableString",
            Element::TeletexString(_) => "TeletexString",
            Element::IA5String(_) => "IA5String",
            Element::VisibleString(_) => "VisibleString",
            Element::BMPString(_) => "BMPString",
            Element::UniversalString(_) => "UniversalString",
            Element::UTCTime(_) => "UTCTime",
            Element::GeneralizedTime(_) => "GeneralizedTime",
            Element::Sequence(_) => "SEQUENCE",
            Element::Set(_) => "SET",
            Element::Constructed { .. } => "constructed value",
            Element::Primitive { .. } => "primitive value",
        }
    }

    /// The error for finding this element where `expected` was required.
    pub fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedElement {
            expected,
            actual: self.kind(),
        }
    }

    /// The text of a character string element.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::UTF8String(s)
            | Element::NumericString(s)
            | Element::PrintableString(s)
            | Element::TeletexString(s)
            | Element::IA5String(s)
            | Element::VisibleString(s)
            | Element::BMPString(s)
            | Element::UniversalString(s) => Some(s),
            _ => None,
        }
    }

    /// A PrintableString restricted to the X.680 character set. The variant
    /// itself carries any 7-bit text, as found in deployed certificates.
    pub fn printable_string(s: impl Into<String>) -> Result<Element> {
        let s = s.into();
        string::validate_printable(&s)?;
        Ok(Element::PrintableString(s))
    }

    /// Wraps `element` in a constructed `[slot]` (EXPLICIT tagging).
    pub fn explicit(slot: u32, element: Element) -> Element {
        Element::Constructed {
            tag: Tag::context_specific(slot, true),
            elements: vec![element],
        }
    }

    /// Replaces this element's outer tag with `[slot]` (IMPLICIT tagging).
    pub fn implicit(&self, slot: u32) -> Result<Element> {
        self.retag(Tag::context_specific(slot, false))
    }

    /// Reads this element's content as if it carried `tag`. This undoes
    /// IMPLICIT tagging: `[0] IMPLICIT INTEGER` becomes an INTEGER.
    pub fn reinterpret(&self, tag: Tag) -> Result<Element> {
        self.retag(tag)
    }

    fn retag(&self, tag: Tag) -> Result<Element> {
        let tlv = Tlv::try_from(self)?.retag(tag);
        Element::try_from(&tlv)
    }

    /// The single element inside an EXPLICIT `[n]` wrapper.
    pub fn unwrap_explicit(&self) -> Result<&Element> {
        match self {
            Element::Constructed { elements, .. } if elements.len() == 1 => Ok(&elements[0]),
            Element::Constructed { tag, elements } => Err(Error::ExplicitTagElementCount {
                tag: *tag,
                count: elements.len(),
            }),
            Element::Primitive { tag, .. } => Err(Error::ExpectedConstructed(*tag)),
            other => Err(other.unexpected("explicitly tagged value")),
        }
    }
}

fn decode_children(kind: &'static str, tlvs: &[Tlv]) -> Result<Vec<Element>> {
    tlvs.iter()
        .enumerate()
        .map(|(i, tlv)| Element::try_from(tlv).with_context(|| format!("{} item {}", kind, i)))
        .collect()
}

fn decode_boolean(data: &[u8]) -> Result<bool> {
    match data {
        [b] => Ok(*b != 0x00),
        _ => Err(Error::BooleanInvalidLength(data.len())),
    }
}

fn decode_primitive(tag: Tag, data: &[u8]) -> Result<Element> {
    let element = match tag.number() {
        universal::BOOLEAN => Element::Boolean(decode_boolean(data)?),
        universal::INTEGER => Element::Integer(Integer::try_from(data)?),
        universal::ENUMERATED => Element::Enumerated(Integer::try_from(data)?),
        universal::BIT_STRING => Element::BitString(BitString::try_from(data)?),
        universal::OCTET_STRING => Element::OctetString(OctetString::from(data)),
        universal::NULL if data.is_empty() => Element::Null,
        universal::NULL => return Err(Error::NullNotEmpty(data.len())),
        universal::OBJECT_IDENTIFIER => Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?),
        universal::UTF8_STRING => Element::UTF8String(string::decode_utf8(data)?),
        universal::NUMERIC_STRING => Element::NumericString(string::decode_numeric(data)?),
        universal::PRINTABLE_STRING => Element::PrintableString(string::decode_printable(data)?),
        universal::TELETEX_STRING => Element::TeletexString(string::decode_teletex(data)),
        universal::IA5_STRING => Element::IA5String(string::decode_ia5(data)?),
        universal::VISIBLE_STRING => Element::VisibleString(string::decode_visible(data)?),
        universal::BMP_STRING => Element::BMPString(string::decode_bmp(data)?),
        universal::UNIVERSAL_STRING => Element::UniversalString(string::decode_universal(data)?),
        universal::UTC_TIME => Element::UTCTime(time::parse_utc_time(data)?),
        universal::GENERALIZED_TIME => Element::GeneralizedTime(time::parse_generalized_time(data)?),
        universal::SEQUENCE | universal::SET => return Err(Error::ExpectedConstructed(tag)),
        _ => Element::Primitive {
            tag,
            data: data.to_vec(),
        },
    };
    Ok(element)
}

fn decode_constructed(tag: Tag, tlvs: &[Tlv]) -> Result<Element> {
    match tag.number() {
        universal::SEQUENCE => Ok(Element::Sequence(decode_children("SEQUENCE", tlvs)?)),
        universal::SET => Ok(Element::Set(decode_children("SET", tlvs)?)),
        universal::BOOLEAN
        | universal::INTEGER
        | universal::ENUMERATED
        | universal::NULL
        | universal::OBJECT_IDENTIFIER => Err(Error::ExpectedPrimitive(tag)),
        _ => Ok(Element::Constructed {
            tag,
            elements: decode_children("constructed value", tlvs)?,
        }),
    }
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self> {
        let tag = *tlv.tag();
        match (tag.is_universal(), tlv.value()) {
            (true, Value::Data(data)) => decode_primitive(tag, data),
            (true, Value::Tlvs(tlvs)) => decode_constructed(tag, tlvs),
            (false, Value::Data(data)) => Ok(Element::Primitive {
                tag,
                data: data.clone(),
            }),
            (false, Value::Tlvs(tlvs)) => Ok(Element::Constructed {
                tag,
                elements: decode_children("constructed value", tlvs)?,
            }),
        }
    }
}

impl DecodableFrom<Tlv> for Element {}

impl Decoder<Tlv, Element> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<Element> {
        Element::try_from(self)
    }
}

/// Whether a generic container may carry `tag`. Universal tags that decode
/// to a typed variant, and end-of-contents, would not read back the same.
fn is_generic_tag(tag: Tag) -> bool {
    if !tag.is_universal() {
        return true;
    }
    match tag.number() {
        universal::END_OF_CONTENTS
        | universal::BOOLEAN
        | universal::INTEGER
        | universal::ENUMERATED
        | universal::NULL
        | universal::OBJECT_IDENTIFIER
        | universal::SEQUENCE
        | universal::SET => false,
        // BER constructed strings stay generic
        universal::BIT_STRING
        | universal::OCTET_STRING
        | universal::UTF8_STRING
        | universal::NUMERIC_STRING
        | universal::PRINTABLE_STRING
        | universal::TELETEX_STRING
        | universal::IA5_STRING
        | universal::VISIBLE_STRING
        | universal::BMP_STRING
        | universal::UNIVERSAL_STRING
        | universal::UTC_TIME
        | universal::GENERALIZED_TIME => tag.is_constructed(),
        _ => true,
    }
}

fn encode_children(elements: &[Element]) -> Result<Vec<Tlv>> {
    elements.iter().map(Tlv::try_from).collect()
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let tag = element.tag();
        let generic = match element {
            Element::Constructed { tag, .. } => Some(tag.with_constructed(true)),
            Element::Primitive { tag, .. } => Some(tag.with_constructed(false)),
            _ => None,
        };
        if let Some(tag) = generic.filter(|tag| !is_generic_tag(*tag)) {
            return Err(Error::GenericUniversalTag(tag));
        }
        let data = match element {
            Element::Sequence(elements)
            | Element::Set(elements)
            | Element::Constructed { elements, .. } => {
                return Ok(Tlv::new_constructed(tag, encode_children(elements)?));
            }
            Element::Primitive { data, .. } => data.clone(),
            Element::Boolean(b) => vec![if *b { 0xFF } else { 0x00 }],
            Element::Integer(i) | Element::Enumerated(i) => i.to_bytes(),
            Element::BitString(bs) => bs.to_bytes(),
            Element::OctetString(os) => os.as_bytes().to_vec(),
            Element::Null => vec![],
            Element::ObjectIdentifier(oid) => oid.to_bytes(),
            Element::UTF8String(s) => s.as_bytes().to_vec(),
            Element::NumericString(s) => string::encode_numeric(s)?,
            Element::PrintableString(s) => string::encode_printable(s)?,
            Element::TeletexString(s) => string::encode_teletex(s)?,
            Element::IA5String(s) => string::encode_ia5(s)?,
            Element::VisibleString(s) => string::encode_visible(s)?,
            Element::BMPString(s) => string::encode_bmp(s),
            Element::UniversalString(s) => string::encode_universal(s),
            Element::UTCTime(dt) => time::format_utc_time(dt)?,
            Element::GeneralizedTime(dt) => time::format_generalized_time(dt)?,
        };
        Ok(Tlv::new_primitive(tag, data))
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        Tlv::try_from(self)
    }
}

impl TryFrom<&Element> for bool {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::Boolean(b) => Ok(*b),
            other => Err(other.unexpected("BOOLEAN")),
        }
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Element::Boolean(value)
    }
}

impl TryFrom<&Element> for () {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::Null => Ok(()),
            other => Err(other.unexpected("NULL")),
        }
    }
}

impl From<()> for Element {
    fn from(_: ()) -> Self {
        Element::Null
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, elements: &[Element]) -> std::fmt::Result {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", element)?;
    }
    Ok(())
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::Enumerated(i) => write!(f, "Enumerated({})", i),
            Element::BitString(bs) => write!(f, "BitString({})", bs),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::UTF8String(s) => write!(f, "UTF8String({})", s),
            Element::NumericString(s) => write!(f, "NumericString({})", s),
            Element::PrintableString(s) => write!(f, "PrintableString({})", s),
            Element::TeletexString(s) => write!(f, "TeletexString({})", s),
            Element::IA5String(s) => write!(f, "IA5String({})", s),
            Element::VisibleString(s) => write!(f, "VisibleString({})", s),
            Element::BMPString(s) => write!(f, "BMPString({})", s),
            Element::UniversalString(s) => write!(f, "UniversalString({})", s),
            Element::UTCTime(dt) => write!(f, "UTCTime({})", dt),
            Element::GeneralizedTime(dt) => write!(f, "GeneralizedTime({})", dt),
            Element::Sequence(elements) => {
                write!(f, "Sequence(")?;
                write_list(f, elements)?;
                write!(f, ")")
            }
            Element::Set(elements) => {
                write!(f, "Set(")?;
                write_list(f, elements)?;
                write!(f, ")")
            }
            Element::Constructed { tag, elements } => {
                write!(f, "{}(", tag)?;
                write_list(f, elements)?;
                write!(f, ")")
            }
            Element::Primitive { tag, data } => {
                write!(f, "{}(", tag)?;
                for b in data {
                    write!(f, "{:02x}", b)?;
                }
                write!(f, ")")
            }
        }
    }
}
