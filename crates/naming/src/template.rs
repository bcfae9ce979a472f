//! Artifact name templating.
//!
//! Templates are plain strings containing `${key}` placeholders, where `key`
//! is one of the [`Field`] keys:
//!
//! | Placeholder | Example (`/work/sub/a.txt`, root `/work`) |
//! |-------------|--------------------------------------------|
//! | `${root}`   | `/work`                                    |
//! | `${dir}`    | `sub`                                      |
//! | `${base}`   | `a.txt`                                    |
//! | `${name}`   | `a`                                        |
//! | `${ext}`    | `.txt`                                     |
//!
//! Unknown placeholders are kept verbatim, and every occurrence of a known
//! placeholder is substituted. Field values are inserted in a single pass, so
//! a file name that happens to contain `${name}` is never expanded again.

use crate::fields::{Field, PathFields};
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::MAIN_SEPARATOR;
use std::str::FromStr;

/// Template used in per-file mode when none is configured.
pub const DEFAULT_TEMPLATE: &str = "${base}";

const OPEN: &str = "${";
const CLOSE: char = '}';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed artifact name template.
///
/// Parsing never fails: anything that isn't a recognized placeholder is
/// literal text. The parsed form is reused for every file in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}
impl FromStr for NameTemplate {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
impl Default for NameTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}
impl Display for NameTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.source)
    }
}
impl NameTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_str();
        while let Some(start) = rest.find(OPEN) {
            literal.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                // Unterminated placeholder, the remainder is literal.
                literal.push_str(&rest[start..]);
                rest = "";
                break;
            };
            match Field::from_key(&after[..end]) {
                Some(field) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                },
                None => literal.push_str(&rest[start..start + OPEN.len() + end + 1]),
            }
            rest = &after[end + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { source, segments }
    }

    /// The template exactly as it was configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitutes `fields` into the template and [`sanitize`]s the result.
    #[must_use]
    pub fn render(&self, fields: &PathFields) -> String {
        sanitize(self.substitute(fields))
    }

    fn substitute(&self, fields: &PathFields) -> String {
        self.segments.iter().fold(String::with_capacity(self.source.len()), |mut out, segment| {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(fields.get(*field)),
            }
            out
        })
    }
}

/// Makes a rendered name safe to use as a flat artifact name.
///
/// Applied in order, each logged as a warning when it triggers:
/// 1. a single leading path separator is removed,
/// 2. every `:` becomes `-`,
/// 3. every remaining path separator becomes `_`.
///
/// Sanitizing an already sanitized name returns it unchanged.
pub fn sanitize(name: impl Into<String>) -> String {
    let mut name = name.into();
    if name.starts_with(MAIN_SEPARATOR) {
        tracing::warn!(%name, "Artifact name starts with {MAIN_SEPARATOR}");
        name.remove(0);
    }
    if name.contains(':') {
        tracing::warn!(%name, "Artifact name includes :");
        name = name.replace(':', "-");
    }
    if name.contains(MAIN_SEPARATOR) {
        tracing::warn!(%name, "Artifact name includes {MAIN_SEPARATOR}");
        name = name.replace(MAIN_SEPARATOR, "_");
    }
    name
}
