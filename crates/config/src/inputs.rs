//! Raw inputs and their layered loading.

use crate::error::{ErrorKind, Result};
use crate::policy::{FailurePolicy, NoFilesPolicy};
use crate::request::{Mode, Settings, UploadRequest};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uplift_naming::NameTemplate;
use uplift_storage::CompressionLevel;

/// Configuration file read from the current directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "uplift.toml";
/// Prefix of environment variables carrying inputs (`INPUT_PATH`, `INPUT_IF-NO-FILES-FOUND`, ...).
pub const ENV_PREFIX: &str = "INPUT_";
/// Environment variable holding the workspace directory.
pub const WORKSPACE_ENV: &str = "GITHUB_WORKSPACE";
/// Artifact name used in single-artifact mode when none is configured.
pub const DEFAULT_ARTIFACT_NAME: &str = "artifact";

const TRUE_VALUES: [&str; 3] = ["true", "True", "TRUE"];
const FALSE_VALUES: [&str; 3] = ["false", "False", "FALSE"];

/// Inputs exactly as they were provided, before any validation.
///
/// Every value is kept as a trimmed string (empty strings count as unset),
/// whatever type the source used: `retention-days = 5` in a TOML file and
/// `INPUT_RETENTION-DAYS=5` in the environment end up identical.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Inputs {
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub artifact_per_file: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub artifact_name_rule: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub if_no_files_found: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub include_hidden_files: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub upload_failure: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

impl Inputs {
    /// Built-in defaults, the lowest layer of every [`Loader`].
    pub fn defaults() -> Self {
        Self {
            name: Some(DEFAULT_ARTIFACT_NAME.to_string()),
            if_no_files_found: Some(NoFilesPolicy::default().to_string()),
            ..Self::default()
        }
    }

    /// Turn raw inputs into [`Settings`], selecting the upload [`Mode`].
    ///
    /// `artifact-per-file` is lenient (only `true`, `True` and `TRUE` enable
    /// it) while `overwrite` and `include-hidden-files` must be one of the
    /// six accepted boolean spellings.
    pub fn validate(&self) -> Result<Settings> {
        let Some(search_path) = self.path.clone() else {
            exn::bail!(ErrorKind::MissingPath);
        };
        let no_files_policy = match self.if_no_files_found.as_deref() {
            Some(value) => value.parse()?,
            None => NoFilesPolicy::default(),
        };
        let retention_days = self.retention_days.as_deref().map(parse_retention).transpose()?;
        let compression_level = self
            .compression_level
            .as_deref()
            .map(|value| value.parse::<CompressionLevel>().or_raise(|| ErrorKind::InvalidCompression(value.to_string())))
            .transpose()?;
        let overwrite = strict_bool("overwrite", self.overwrite.as_deref())?;
        let include_hidden_files = strict_bool("include-hidden-files", self.include_hidden_files.as_deref())?;
        let upload_failure = match self.upload_failure.as_deref() {
            Some(value) => value.parse()?,
            None => FailurePolicy::default(),
        };
        let workspace = self.workspace.as_deref().map(resolve_workspace).transpose()?;
        if workspace.is_none() {
            tracing::info!("{WORKSPACE_ENV} is not set, artifact names will be relative to the root directory's parent");
        }

        Ok(Settings {
            request: UploadRequest {
                search_path,
                no_files_policy,
                overwrite,
                retention_days,
                compression_level,
                upload_failure,
            },
            mode: self.mode()?,
            workspace,
            include_hidden_files,
        })
    }

    fn mode(&self) -> Result<Mode> {
        let per_file = self.artifact_per_file.as_deref().is_some_and(|value| TRUE_VALUES.contains(&value));
        if per_file {
            if let Some(name) = &self.name {
                tracing::debug!(%name, "Artifact name is ignored when uploading one artifact per file");
            }
            let template = self.artifact_name_rule.as_deref().map(NameTemplate::new).unwrap_or_default();
            return Ok(Mode::PerFile { template });
        }
        match &self.name {
            Some(name) => Ok(Mode::SingleArtifact { name: name.clone() }),
            None => exn::bail!(ErrorKind::MissingName),
        }
    }
}

fn strict_bool(key: &'static str, value: Option<&str>) -> Result<bool> {
    match value {
        None => Ok(false),
        Some(value) if TRUE_VALUES.contains(&value) => Ok(true),
        Some(value) if FALSE_VALUES.contains(&value) => Ok(false),
        Some(value) => exn::bail!(ErrorKind::InvalidBoolean {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_retention(value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => exn::bail!(ErrorKind::InvalidRetention(value.to_string())),
    }
}

fn resolve_workspace(value: &str) -> Result<PathBuf> {
    std::path::absolute(Path::new(value)).or_raise(|| ErrorKind::InvalidWorkspace(value.to_string()))
}

/// Layered input loading: defaults, then a TOML file, then the environment,
/// then explicit overrides (usually command-line flags).
#[derive(Debug, Default)]
pub struct Loader {
    file: Option<PathBuf>,
    overrides: Inputs,
}
impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this configuration file instead of [`DEFAULT_CONFIG_FILE`]. It must exist.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn overrides(mut self, inputs: Inputs) -> Self {
        self.overrides = inputs;
        self
    }

    pub fn figment(&self) -> Figment {
        let file = self.file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Inputs::defaults()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace('_', "-").into()))
            .merge(Env::raw().only(&[WORKSPACE_ENV]).map(|_| "workspace".into()))
            .merge(Serialized::defaults(&self.overrides))
    }

    pub fn load(&self) -> Result<Inputs> {
        if let Some(file) = &self.file {
            if !file.is_file() {
                exn::bail!(ErrorKind::MissingConfigFile(file.clone()));
            }
            tracing::debug!(path = %file.display(), "Loading inputs from configuration file");
        }
        self.figment().extract().or_raise(|| ErrorKind::Load)
    }
}

mod lenient {
    use serde::Deserializer;
    use serde::de::{Error, Visitor};
    use std::fmt::{Formatter, Result as FmtResult};

    /// Accepts strings, booleans and numbers; blank strings become `None`.
    pub(super) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        deserializer.deserialize_any(LenientString)
    }

    struct LenientString;
    impl<'de> Visitor<'de> for LenientString {
        type Value = Option<String>;

        fn expecting(&self, f: &mut Formatter) -> FmtResult {
            f.write_str("a string, boolean or number")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            Ok((!v.is_empty()).then(|| v.to_string()))
        }

        fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }
}
