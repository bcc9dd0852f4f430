//! # kumiki
//!
//! Core conversion traits for the kumiki BER/DER codec.
//!
//! Every layer of the codec is a step in a chain of typed conversions:
//!
//! ```text
//! &[u8] → Der → ASN1Object
//! ```
//!
//! Each step uses the `Decoder` trait to convert from one representation to
//! the next, and the `Encoder` trait to convert in the reverse direction.
//! Higher-level structures (certificates, key containers, message envelopes)
//! plug into the same chain by implementing the traits for their own types.
//!
//! ## Type Safety
//!
//! Both traits are constrained by marker traits (`DecodableFrom` and
//! `EncodableTo`), so a conversion only exists when it has been declared for
//! that exact pair of types.
//!
//! ## Example
//!
//! ```ignore
//! use kumiki::decoder::Decoder;
//! use kumiki::encoder::Encoder;
//! use kumiki_asn1::ASN1Object;
//! use kumiki_der::Der;
//!
//! let bytes = vec![0x30, 0x03, 0x02, 0x01, 0x05];
//! let der: Der = bytes.decode().unwrap();
//! let obj: ASN1Object = der.decode().unwrap();
//!
//! let der: Der = obj.encode().unwrap();
//! let encoded: Vec<u8> = der.encode().unwrap();
//! assert_eq!(bytes, encoded);
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
