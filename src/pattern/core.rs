//! Pattern core - template compilation and per-request path matching.

use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::RegistrationError;

/// Maximum number of path captures before heap allocation.
/// Most route patterns have ≤4 capture groups (e.g., /users/{id}/posts/{post_id}).
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Stack-allocated capture storage for the hot path.
///
/// Captures are positional: the string at index `i` came from capturing group
/// `i + 1` of the compiled pattern. Values are owned `String`s because they
/// are per-request data sliced out of the URL.
pub type CaptureVec = SmallVec<[String; MAX_INLINE_CAPTURES]>;

/// A compiled, anchored path pattern
///
/// Built once at registration time from either a `{name}`-placeholder template
/// or a raw regex body (see the [module docs](crate::pattern)). Matching a
/// request path against a compiled pattern allocates only for the extracted
/// capture strings.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The template exactly as supplied at registration
    template: String,
    /// Anchored regex compiled from the template
    regex: Regex,
    /// Number of capturing groups in the compiled regex
    capture_count: usize,
}

impl PathPattern {
    /// Compile a path template into an anchored pattern
    ///
    /// Templates containing a `{name}`-style placeholder use the placeholder
    /// dialect; everything else is treated as a raw regex body, so a counted
    /// repetition like `\d{4}` stays a repetition. Either way the result is
    /// anchored so that only full-path matches succeed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidPattern`] if the template is
    /// malformed (an unterminated `{name}` placeholder, or a regex body that
    /// fails to compile).
    pub fn compile(template: &str) -> Result<Self, RegistrationError> {
        let anchored = if Self::has_placeholder(template) {
            Self::placeholder_to_regex(template)?
        } else {
            // Raw regex body. The non-capturing wrapper keeps anchoring
            // correct for top-level alternations without adding a group.
            format!("^(?:{})$", template)
        };

        let regex = Regex::new(&anchored).map_err(|source| RegistrationError::InvalidPattern {
            pattern: template.to_string(),
            source,
        })?;
        let capture_count = regex.captures_len() - 1;

        debug!(
            template = %template,
            regex = %anchored,
            capture_count = capture_count,
            "Path pattern compiled"
        );

        Ok(Self {
            template: template.to_string(),
            regex,
            capture_count,
        })
    }

    /// Whether the template carries a `{name}`-style placeholder
    ///
    /// Placeholder names start with a letter or underscore, which is what
    /// distinguishes `{id}` from a regex counted repetition such as `{4}` or
    /// `{2,5}`. A `{` followed by `}`, an identifier start, or nothing at all
    /// selects the placeholder dialect (the degenerate forms are then rejected
    /// as malformed placeholders rather than handed to the regex parser).
    fn has_placeholder(template: &str) -> bool {
        let bytes = template.as_bytes();
        bytes.iter().enumerate().any(|(i, &b)| {
            b == b'{'
                && match bytes.get(i + 1) {
                    Some(&n) => n.is_ascii_alphabetic() || n == b'_' || n == b'}',
                    None => true,
                }
        })
    }

    /// Convert a `{name}`-placeholder template to an anchored regex string
    ///
    /// Transforms templates like `/users/{id}` into `^/users/([^/]+)$`. Each
    /// placeholder matches exactly one path segment; literal segments are
    /// escaped so metacharacters in them match themselves.
    fn placeholder_to_regex(template: &str) -> Result<String, RegistrationError> {
        if template == "/" {
            return Ok(r"^/$".to_string());
        }

        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');

        for segment in template.split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment.starts_with('{') || segment.ends_with('}') {
                let well_formed = segment.starts_with('{')
                    && segment.ends_with('}')
                    && segment.len() > 2
                    && !segment[1..segment.len() - 1].contains(['{', '}']);
                if !well_formed {
                    return Err(RegistrationError::InvalidPattern {
                        pattern: template.to_string(),
                        // Reuse the regex error type for a malformed placeholder:
                        // the brace never opened/closed a valid group.
                        source: regex::Error::Syntax(format!(
                            "malformed placeholder segment '{}'",
                            segment
                        )),
                    });
                }
                pattern.push_str("/([^/]+)");
            } else {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok(pattern)
    }

    /// Match a concrete request path against this pattern
    ///
    /// Returns the captured substrings in left-to-right group order, or `None`
    /// if the path does not fully match. A group that participated in the
    /// match but captured nothing yields an empty string.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<CaptureVec> {
        let caps = self.regex.captures(path)?;
        let mut out = CaptureVec::new();
        for idx in 1..caps.len() {
            out.push(caps.get(idx).map_or_else(String::new, |m| m.as_str().to_string()));
        }
        Some(out)
    }

    /// Number of capturing groups in the compiled pattern
    #[inline]
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// The template exactly as supplied at registration
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}
