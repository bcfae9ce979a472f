mod error;

use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uplift_config::{Inputs, Loader};
use uplift_discovery::{DiscoverOptions, discover};
use uplift_storage::backend::LocalStore;
use uplift_upload::{Report, Uploader, Verdict};

/// Upload matched files as one artifact, or as one artifact per file.
///
/// Every input can also be given as an `INPUT_<NAME>` environment variable
/// (`INPUT_PATH`, `INPUT_IF-NO-FILES-FOUND`, ...) or in a TOML file;
/// command-line flags win.
#[derive(Parser, Debug)]
#[command(name = "uplift", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./uplift.toml when present)
    #[arg(short, long, env = "UPLIFT_CONFIG")]
    config: Option<PathBuf>,
    /// Artifact name in single-artifact mode
    #[arg(short, long)]
    name: Option<String>,
    /// Files, directories or globs to upload, one per line; `!` excludes
    #[arg(short, long)]
    path: Option<String>,
    /// Upload one artifact per matched file
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    artifact_per_file: Option<String>,
    /// Per-file name template, using ${root} ${dir} ${base} ${name} ${ext}
    #[arg(long)]
    artifact_name_rule: Option<String>,
    /// warn, error or ignore
    #[arg(long)]
    if_no_files_found: Option<String>,
    #[arg(long)]
    retention_days: Option<String>,
    /// 0 (no compression) to 9 (best compression)
    #[arg(long)]
    compression_level: Option<String>,
    /// Delete existing artifacts with the same name before uploading
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    overwrite: Option<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    include_hidden_files: Option<String>,
    /// abort or continue, after a per-file upload fails
    #[arg(long)]
    upload_failure: Option<String>,
    /// Directory per-file names are relative to (defaults to $GITHUB_WORKSPACE)
    #[arg(long)]
    workspace: Option<String>,
    /// Directory artifacts are stored in
    #[arg(long, env = "UPLIFT_STORE")]
    store: Option<PathBuf>,
}
impl Cli {
    fn overrides(&self) -> Inputs {
        Inputs {
            name: self.name.clone(),
            path: self.path.clone(),
            artifact_per_file: self.artifact_per_file.clone(),
            artifact_name_rule: self.artifact_name_rule.clone(),
            if_no_files_found: self.if_no_files_found.clone(),
            retention_days: self.retention_days.clone(),
            compression_level: self.compression_level.clone(),
            overwrite: self.overwrite.clone(),
            include_hidden_files: self.include_hidden_files.clone(),
            upload_failure: self.upload_failure.clone(),
            workspace: self.workspace.clone(),
        }
    }

    fn store_root(&self) -> Result<PathBuf> {
        let root = match &self.store {
            Some(store) => store.clone(),
            None => match directories::ProjectDirs::from("", "", "uplift") {
                Some(dirs) => dirs.data_dir().join("artifacts"),
                None => exn::bail!(ErrorKind::Store),
            },
        };
        std::path::absolute(root).or_raise(|| ErrorKind::Store)
    }
}

async fn run(cli: Cli) -> Result<Report> {
    let mut loader = Loader::new().overrides(cli.overrides());
    if let Some(config) = &cli.config {
        loader = loader.file(config);
    }
    let settings = loader.load().and_then(|inputs| inputs.validate()).or_raise(|| ErrorKind::Config)?;

    let cwd = std::env::current_dir().or_raise(|| ErrorKind::Discovery)?;
    let options = DiscoverOptions {
        include_hidden_files: settings.include_hidden_files,
    };
    let found = discover(&settings.request.search_path, &cwd, options).await.or_raise(|| ErrorKind::Discovery)?;

    let store_root = cli.store_root()?;
    tracing::debug!(root = %store_root.display(), "Using local artifact store");
    let store = LocalStore::new("local", &store_root).or_raise(|| ErrorKind::Store)?;

    Uploader::new(Arc::new(store))
        .run(
            &settings.request,
            &settings.mode,
            &found.files,
            &found.root_directory,
            settings.workspace.as_deref(),
        )
        .await
        .or_raise(|| ErrorKind::Upload)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(report) => match report.verdict {
            Verdict::Succeeded => ExitCode::SUCCESS,
            Verdict::Failed(reason) => {
                tracing::error!("{reason}");
                ExitCode::FAILURE
            },
        },
        Err(e) => {
            tracing::error!("{e:?}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["uplift", "--overwrite"], Some("true"))]
    #[case(&["uplift", "--overwrite=False"], Some("False"))]
    #[case(&["uplift"], None)]
    fn test_boolean_flags(#[case] args: &[&str], #[case] expected: Option<&str>) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.overrides().overwrite.as_deref(), expected);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "uplift",
            "--path",
            "dist/",
            "--artifact-per-file",
            "--artifact-name-rule",
            "${name}${ext}",
            "--compression-level",
            "0",
        ])
        .unwrap();
        let inputs = cli.overrides();
        assert_eq!(inputs.path.as_deref(), Some("dist/"));
        assert_eq!(inputs.artifact_per_file.as_deref(), Some("true"));
        assert_eq!(inputs.artifact_name_rule.as_deref(), Some("${name}${ext}"));
        assert_eq!(inputs.compression_level.as_deref(), Some("0"));
        assert_eq!(inputs.name, None);
    }

    #[test]
    fn test_explicit_store_root_made_absolute() {
        let cli = Cli::try_parse_from(["uplift", "--store", "artifacts"]).unwrap();
        let root = cli.store_root().unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("artifacts"));
    }
}
