//! Artifact name validation.

use crate::error::{ErrorKind, Result};

/// Characters an artifact name may never contain.
const FORBIDDEN: [char; 11] = ['"', ':', '<', '>', '|', '*', '?', '\r', '\n', '\\', '/'];

/// Validates an artifact name before anything is written.
///
/// Names must be non-empty, flat (no path separators) and free of the
/// characters in `FORBIDDEN` and NUL bytes.
///
/// # Examples
///
/// ```
/// use uplift_storage::validate_name;
///
/// assert!(validate_name("dist").is_ok());
/// assert!(validate_name("1__report.txt").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("sub/report.txt").is_err());
/// assert!(validate_name("C:report").is_err());
/// ```
pub fn validate(name: &str) -> Result<&str> {
    if name.is_empty() || name.contains('\0') || name.contains(FORBIDDEN) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    // Reserved directory names would escape or alias the store root.
    if matches!(name, "." | "..") {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    Ok(name)
}
