//! Search path lines: literal paths and globs.
//!
//! Supported wildcards are `*` and `?` (never crossing a `/`), `[...]`
//! character classes (`[!...]` negates) and `**` as a whole segment, which
//! matches any number of directories. A pattern that matches a directory
//! matches every file beneath it.

use crate::error::{ErrorKind, Result};
use regex::Regex;
use std::path::{Component, Path, PathBuf};

const WILDCARDS: [char; 3] = ['*', '?', '['];
const GLOBSTAR: &str = "**";

#[derive(Clone, Debug)]
enum Matcher {
    Literal,
    Glob(Regex),
}

/// One non-empty line of a search path.
#[derive(Clone, Debug)]
pub struct SearchPattern {
    exclude: bool,
    base: PathBuf,
    matcher: Matcher,
}
impl SearchPattern {
    /// Parse a search path line. Relative paths are resolved against `cwd`.
    pub fn parse(line: &str, cwd: &Path) -> Result<Self> {
        let (exclude, pattern) = match line.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, line),
        };
        if pattern.is_empty() {
            exn::bail!(ErrorKind::InvalidPattern(line.to_string()));
        }
        let absolute = normalize(&cwd.join(pattern));
        if !absolute.to_string_lossy().contains(WILDCARDS) {
            return Ok(Self {
                exclude,
                base: absolute,
                matcher: Matcher::Literal,
            });
        }

        let mut base = PathBuf::new();
        for component in absolute.components() {
            if component.as_os_str().to_string_lossy().contains(WILDCARDS) {
                break;
            }
            base.push(component);
        }
        let regex = Regex::new(&glob_to_regex(line, &absolute.to_string_lossy())?)
            .map_err(|_| ErrorKind::InvalidPattern(line.to_string()))?;
        Ok(Self {
            exclude,
            base,
            matcher: Matcher::Glob(regex),
        })
    }

    /// Whether this line starts with `!`.
    #[must_use]
    pub fn is_exclude(&self) -> bool {
        self.exclude
    }

    /// The literal path of the pattern, or the directory before its first wildcard.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether `path` (or one of its ancestors below the base) matches.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.ancestors()
            .take_while(|ancestor| ancestor.starts_with(&self.base))
            .any(|ancestor| match &self.matcher {
                Matcher::Literal => ancestor == self.base,
                Matcher::Glob(regex) => regex.is_match(&ancestor.to_string_lossy()),
            })
    }
}

/// Lexically resolve `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                normalized.pop();
            },
            other => normalized.push(other),
        }
    }
    normalized
}

fn glob_to_regex(line: &str, pattern: &str) -> Result<String> {
    let segments: Vec<&str> = pattern.split('/').collect();
    let mut regex = String::from("^");
    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();
        if *segment == GLOBSTAR {
            regex.push_str(if last { ".*" } else { "(?:[^/]+/)*" });
            continue;
        }
        translate_segment(line, segment, &mut regex)?;
        if !last {
            regex.push('/');
        }
    }
    regex.push('$');
    Ok(regex)
}

fn translate_segment(line: &str, segment: &str, regex: &mut String) -> Result<()> {
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for (n, c) in chars.by_ref().enumerate() {
                    match c {
                        ']' if n > 0 => {
                            closed = true;
                            break;
                        },
                        '!' if n == 0 => class.push('^'),
                        '\\' | '[' | '&' | '~' => {
                            class.push('\\');
                            class.push(c);
                        },
                        c => class.push(c),
                    }
                }
                if !closed {
                    exn::bail!(ErrorKind::InvalidPattern(line.to_string()));
                }
                regex.push('[');
                regex.push_str(&class);
                regex.push(']');
            },
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    Ok(())
}
