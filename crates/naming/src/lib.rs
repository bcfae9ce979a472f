//! Artifact naming for per-file uploads.
//!
//! Every matched file is described by a small, closed set of [`PathFields`]
//! (`root`, `dir`, `base`, `name`, `ext`). A [`NameTemplate`] such as
//! `${dir}_${base}` is rendered against those fields and then sanitized into a
//! flat, storage-safe artifact name. [`AssignedNames`] keeps track of names
//! already used within one run and disambiguates repeats.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use uplift_naming::{AssignedNames, NameTemplate, PathFields};
//!
//! let template: NameTemplate = "${base}".parse().unwrap();
//! let mut assigned = AssignedNames::new();
//!
//! let mut names = Vec::new();
//! for (index, file) in ["/root/a/report.txt", "/root/b/report.txt"].into_iter().enumerate() {
//!     let fields = PathFields::derive(Path::new(file), Path::new("/root"));
//!     let name = assigned.resolve(template.render(&fields), index);
//!     assigned.insert(name.clone());
//!     names.push(name);
//! }
//! assert_eq!(names, ["report.txt", "1__report.txt"]);
//! ```

mod collision;
mod fields;
mod template;

pub use crate::collision::{AssignedNames, INDEX_SEPARATOR};
pub use crate::fields::{Field, PathFields};
pub use crate::template::{DEFAULT_TEMPLATE, NameTemplate, sanitize};
