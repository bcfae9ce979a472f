//! Batch upload orchestration for uplift.
//!
//! In single-artifact mode all files go to the store in one upload. In
//! per-file mode every file gets its own artifact, named by rendering the
//! configured template and disambiguated against the names already used in
//! the run. With `overwrite`, existing artifacts are deleted first on a
//! best-effort basis.

mod delete;
pub mod error;
mod report;
mod run;

pub use crate::delete::{Deletion, delete_if_exists};
pub use crate::report::{Report, UploadOutcome, UploadResult, Verdict};
pub use crate::run::{Uploader, effective_root};
