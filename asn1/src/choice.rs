//! CHOICE support.
//!
//! A CHOICE is an ordinary Rust enum implementing [`Choice`]. The static
//! [`Choice::ALTERNATIVES`] table maps wire tags to alternative names, and the
//! provided methods do the tag dispatch and the IMPLICIT/EXPLICIT handling so
//! the enum only converts between its variants and untagged elements.

use kumiki_der::Tag;
use tracing::warn;

use crate::Element;
use crate::error::{Error, Result, ResultExt};

/// How an alternative is tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tagging {
    /// Identified by its own universal tag.
    Untagged,
    /// `[slot] IMPLICIT`: the universal tag is replaced.
    Implicit(u32),
    /// `[slot] EXPLICIT`: the value is wrapped in a constructed `[slot]`.
    Explicit(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alternative {
    pub name: &'static str,
    /// The alternative's underlying universal tag.
    pub tag: Tag,
    pub tagging: Tagging,
}

impl Alternative {
    pub const fn untagged(name: &'static str, tag: Tag) -> Self {
        Alternative {
            name,
            tag,
            tagging: Tagging::Untagged,
        }
    }

    pub const fn implicit(name: &'static str, slot: u32, tag: Tag) -> Self {
        Alternative {
            name,
            tag,
            tagging: Tagging::Implicit(slot),
        }
    }

    pub const fn explicit(name: &'static str, slot: u32, tag: Tag) -> Self {
        Alternative {
            name,
            tag,
            tagging: Tagging::Explicit(slot),
        }
    }

    /// The outer tag this alternative carries on the wire.
    pub fn wire_tag(&self) -> Tag {
        match self.tagging {
            Tagging::Untagged => self.tag,
            Tagging::Implicit(slot) => Tag::context_specific(slot, self.tag.is_constructed()),
            Tagging::Explicit(slot) => Tag::context_specific(slot, true),
        }
    }

    fn matches(&self, tag: &Tag) -> bool {
        self.wire_tag().same_identity(tag)
    }
}

pub trait Choice: Sized {
    const NAME: &'static str;

    const ALTERNATIVES: &'static [Alternative];

    /// Alternative used when no entry of [`Choice::ALTERNATIVES`] matches.
    /// Leave as `None` unless the schema really has a catch-all member; the
    /// element is then handed over as-is.
    const FALLBACK: Option<&'static str> = None;

    /// Builds the value for the named alternative from its untagged element.
    fn from_alternative(name: &'static str, element: &Element) -> Result<Self>;

    /// Names the selected alternative and returns its untagged element.
    fn to_alternative(&self) -> Result<(&'static str, Element)>;

    fn from_element(element: &Element) -> Result<Self> {
        let tag = element.tag();
        let Some(alternative) = Self::ALTERNATIVES.iter().find(|alt| alt.matches(&tag)) else {
            return match Self::FALLBACK {
                Some(name) => {
                    warn!(choice = Self::NAME, %tag, alternative = name, "no alternative matches, using fallback");
                    Self::from_alternative(name, element)
                        .with_context(|| format!("CHOICE {} alternative {}", Self::NAME, name))
                }
                None => Err(Error::ChoiceUnknownTag {
                    choice: Self::NAME,
                    tag,
                }),
            };
        };

        let context = || format!("CHOICE {} alternative {}", Self::NAME, alternative.name);
        let untagged = match alternative.tagging {
            Tagging::Untagged => element.clone(),
            Tagging::Implicit(_) => element.reinterpret(alternative.tag).with_context(context)?,
            Tagging::Explicit(_) => element.unwrap_explicit().with_context(context)?.clone(),
        };
        Self::from_alternative(alternative.name, &untagged).with_context(context)
    }

    fn to_element(&self) -> Result<Element> {
        let (name, element) = self.to_alternative()?;
        let Some(alternative) = Self::ALTERNATIVES.iter().find(|alt| alt.name == name) else {
            if Self::FALLBACK == Some(name) {
                return Ok(element);
            }
            return Err(Error::ChoiceUnknownAlternative {
                choice: Self::NAME,
                alternative: name,
            });
        };
        match alternative.tagging {
            Tagging::Untagged => Ok(element),
            Tagging::Implicit(slot) => element.implicit(slot),
            Tagging::Explicit(slot) => Ok(Element::explicit(slot, element)),
        }
    }
}
