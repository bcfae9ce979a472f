//! Per-upload options.

use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;

/// Compression level applied by stores when a request doesn't set one.
pub const DEFAULT_COMPRESSION_LEVEL: CompressionLevel = CompressionLevel(6);

/// A zlib compression level in the inclusive range `0..=9`.
///
/// `0` is a valid level (store without compressing), which is why requests
/// carry an `Option<CompressionLevel>` rather than treating `0` as unset.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u32);
impl CompressionLevel {
    pub const MIN: u32 = 0;
    pub const MAX: u32 = 9;

    #[must_use]
    pub fn get(&self) -> u32 {
        self.0
    }
}
impl Default for CompressionLevel {
    fn default() -> Self {
        DEFAULT_COMPRESSION_LEVEL
    }
}
impl TryFrom<u32> for CompressionLevel {
    type Error = Error;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            exn::bail!(ErrorKind::InvalidCompressionLevel(format!(
                "{value} is outside of {}-{}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }
}
impl FromStr for CompressionLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(level) => Self::try_from(level),
            Err(_) => exn::bail!(ErrorKind::InvalidCompressionLevel(format!("{s:?} is not a number"))),
        }
    }
}
impl From<CompressionLevel> for flate2::Compression {
    fn from(level: CompressionLevel) -> Self {
        flate2::Compression::new(level.0)
    }
}

/// Options shared by every upload in a run.
///
/// Both keys are only present when explicitly configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Days after which the artifact expires.
    pub retention_days: Option<u32>,
    pub compression_level: Option<CompressionLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("6", 6)]
    #[case("9", 9)]
    #[case(" 3 ", 3)]
    fn test_parse(#[case] input: &str, #[case] expected: u32) {
        assert_eq!(input.parse::<CompressionLevel>().unwrap().get(), expected);
    }

    #[rstest]
    #[case("10")]
    #[case("-1")]
    #[case("")]
    #[case("fast")]
    #[case("1.5")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_zero_is_a_level() {
        let options = UploadOptions {
            retention_days: None,
            compression_level: Some(CompressionLevel::try_from(0).unwrap()),
        };
        assert_eq!(options.compression_level.map(|l| l.get()), Some(0));
        assert_eq!(flate2::Compression::from(options.compression_level.unwrap()).level(), 0);
    }

    #[test]
    fn test_default_level() {
        assert_eq!(CompressionLevel::default(), DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(UploadOptions::default().compression_level, None);
    }
}
