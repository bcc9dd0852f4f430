//! Recursive-descent reader turning bytes into a [`Tlv`] tree.
//!
//! Primitive and constructed values are told apart purely by the constructed
//! bit of the tag; the content of primitive values is never interpreted here.

use nom::Parser;
use nom::bytes::complete::take;
use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::length::{Length, is_minimal_length, parse_length};
use crate::tag::parse_tag;
use crate::tlv::Tlv;

enum Parsed {
    Value(Tlv),
    EndOfContents,
}

/// Parses one value from the start of `input` with the default options.
///
/// Returns the value and the number of bytes consumed, so that callers can
/// walk buffers holding several concatenated values.
pub fn parse(input: &[u8]) -> Result<(Tlv, usize)> {
    parse_with(input, &ParseOptions::default())
}

pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<(Tlv, usize)> {
    if input.is_empty() {
        return Err(Error::Empty);
    }
    trace!(len = input.len(), "parsing value");
    match parse_value(input, options, 1)? {
        (Parsed::Value(tlv), consumed) => Ok((tlv, consumed)),
        (Parsed::EndOfContents, _) => Err(Error::UnexpectedEndOfContents),
    }
}

/// Parses exactly one value spanning the whole of `input`.
pub fn parse_single(input: &[u8], options: &ParseOptions) -> Result<Tlv> {
    let (tlv, consumed) = parse_with(input, options)?;
    if consumed != input.len() {
        return Err(Error::TrailingData(input.len() - consumed));
    }
    Ok(tlv)
}

fn take_content(input: &[u8], len: usize) -> Result<&[u8]> {
    let (_, content) = take(len)
        .parse(input)
        .map_err(|_: nom::Err<Error>| Error::Truncated {
            needed: len,
            remaining: input.len(),
        })?;
    Ok(content)
}

fn parse_value(input: &[u8], options: &ParseOptions, depth: usize) -> Result<(Parsed, usize)> {
    let (after_tag, tag) = parse_tag(input)?;
    let (rest, length) = parse_length(after_tag)?;
    let header_len = input.len() - rest.len();

    if options.require_minimal() {
        if input.len() - after_tag.len() != tag.encoded_len() {
            debug!(%tag, "long-form tag number rejected");
            return Err(Error::TagNumberNotMinimal);
        }
        if !is_minimal_length(length, after_tag.len() - rest.len()) {
            debug!(%tag, "non-minimal length rejected");
            return Err(Error::LengthNotMinimal);
        }
    }

    if tag.is_universal() && tag.number() == 0 {
        return match (tag.is_constructed(), length) {
            (false, Length::Definite(0)) => Ok((Parsed::EndOfContents, header_len)),
            _ => Err(Error::MalformedEndOfContents),
        };
    }

    if depth > options.max_depth() {
        debug!(max = options.max_depth(), "nesting depth limit reached");
        return Err(Error::DepthLimitExceeded {
            max: options.max_depth(),
        });
    }

    match length {
        Length::Definite(len) => {
            let content = take_content(rest, len)?;
            let tlv = if tag.is_constructed() {
                Tlv::new_constructed(tag, parse_definite_children(content, options, depth)?)
            } else {
                Tlv::new_primitive(tag, content.to_vec())
            };
            Ok((Parsed::Value(tlv), header_len + len))
        }
        Length::Indefinite => {
            if !tag.is_constructed() {
                return Err(Error::IndefinitePrimitive);
            }
            if !options.allow_indefinite() {
                debug!(%tag, "indefinite length rejected");
                return Err(Error::IndefiniteLengthNotAllowed);
            }
            trace!(%tag, depth, "indefinite length value");

            let mut tlvs = Vec::new();
            let mut offset = 0;
            loop {
                if offset >= rest.len() {
                    return Err(Error::MissingEndOfContents);
                }
                let (parsed, consumed) = parse_value(&rest[offset..], options, depth + 1)?;
                offset += consumed;
                match parsed {
                    Parsed::Value(tlv) => tlvs.push(tlv),
                    Parsed::EndOfContents => break,
                }
            }
            Ok((
                Parsed::Value(Tlv::new_constructed(tag, tlvs)),
                header_len + offset,
            ))
        }
    }
}

fn parse_definite_children(
    mut content: &[u8],
    options: &ParseOptions,
    depth: usize,
) -> Result<Vec<Tlv>> {
    let mut tlvs = Vec::new();
    while !content.is_empty() {
        let (parsed, consumed) = parse_value(content, options, depth + 1)?;
        match parsed {
            Parsed::Value(tlv) => tlvs.push(tlv),
            Parsed::EndOfContents => return Err(Error::UnexpectedEndOfContents),
        }
        content = &content[consumed..];
    }
    Ok(tlvs)
}
