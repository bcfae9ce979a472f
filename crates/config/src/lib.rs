//! Input loading and validation for uplift.
//!
//! Raw inputs are collected by a [`Loader`] (defaults, an optional TOML
//! file, `INPUT_*` environment variables, then command-line overrides) and
//! validated once into [`Settings`]. Nothing downstream reads configuration
//! from the environment again.
//!
//! ```
//! use uplift_config::{Inputs, Mode};
//!
//! let inputs = Inputs {
//!     path: Some("dist/".to_string()),
//!     artifact_per_file: Some("true".to_string()),
//!     ..Inputs::defaults()
//! };
//! let settings = inputs.validate().unwrap();
//! assert!(matches!(settings.mode, Mode::PerFile { .. }));
//! ```

pub mod error;
mod inputs;
mod policy;
mod request;

pub use crate::inputs::{DEFAULT_ARTIFACT_NAME, DEFAULT_CONFIG_FILE, ENV_PREFIX, Inputs, Loader, WORKSPACE_ENV};
pub use crate::policy::{DEFAULT_FAILURE_POLICY, FailurePolicy, NoFilesPolicy};
pub use crate::request::{Mode, Settings, UploadRequest};
