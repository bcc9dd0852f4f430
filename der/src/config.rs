//! Parser configuration.

/// Default cap on how deeply constructed values may nest.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits and tolerances applied while parsing untrusted input.
///
/// The default accepts BER indefinite lengths and non-minimal headers, since
/// real-world CMS and PKCS#12 blobs use them. [`ParseOptions::der`] rejects
/// both, so a value it accepts re-encodes to the same bytes.
///
/// ```
/// use kumiki_der::ParseOptions;
///
/// let options = ParseOptions::der().with_max_depth(16);
/// assert!(!options.allow_indefinite());
/// assert!(options.require_minimal());
/// assert_eq!(16, options.max_depth());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    max_depth: usize,
    allow_indefinite: bool,
    require_minimal: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_indefinite: true,
            require_minimal: false,
        }
    }
}

impl ParseOptions {
    /// Strict DER input: definite lengths and shortest-form headers only.
    pub fn der() -> Self {
        ParseOptions {
            allow_indefinite: false,
            require_minimal: true,
            ..Default::default()
        }
    }

    /// Maximum nesting depth. A top-level value is at depth 1.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        ParseOptions { max_depth, ..self }
    }

    pub fn with_indefinite(self, allow_indefinite: bool) -> Self {
        ParseOptions {
            allow_indefinite,
            ..self
        }
    }

    /// Rejects long-form lengths and tag numbers that have a shorter form.
    pub fn with_minimal(self, require_minimal: bool) -> Self {
        ParseOptions {
            require_minimal,
            ..self
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn allow_indefinite(&self) -> bool {
        self.allow_indefinite
    }

    pub fn require_minimal(&self) -> bool {
        self.require_minimal
    }
}
