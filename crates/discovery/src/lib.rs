//! File discovery for uplift.
//!
//! Turns a multi-line search path into the list of files to upload plus
//! the directory they are stored relative to. Each line is a literal file,
//! a literal directory or a glob (see [`SearchPattern`]); lines starting
//! with `!` exclude matches, lines starting with `#` are comments.

pub mod error;
mod pattern;
mod walk;

use crate::error::Result;
pub use crate::pattern::SearchPattern;
use futures::TryStreamExt;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::instrument;

#[derive(Clone, Copy, Debug, Default)]
pub struct DiscoverOptions {
    /// Match files and directories whose name starts with `.`.
    pub include_hidden_files: bool,
}

/// Files matched by a search path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Absolute paths, sorted.
    pub files: Vec<PathBuf>,
    /// Least common ancestor of every include line's base directory.
    pub root_directory: PathBuf,
}

/// Resolve `search_path` (relative lines against `cwd`) into matching files.
///
/// Matching nothing is not an error. Files whose path only differs by case
/// from an earlier file are dropped, as artifact names are case-insensitive.
#[instrument(skip_all, fields(cwd = %cwd.display()))]
pub async fn discover(search_path: &str, cwd: &Path, options: DiscoverOptions) -> Result<SearchResult> {
    let patterns = search_path
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| SearchPattern::parse(line, cwd))
        .collect::<Result<Vec<_>>>()?;
    let (excludes, includes): (Vec<_>, Vec<_>) = patterns.into_iter().partition(SearchPattern::is_exclude);

    let mut matched = BTreeSet::new();
    for include in &includes {
        let mut files = walk::walk(include.base().to_path_buf(), options.include_hidden_files);
        while let Some(file) = files.try_next().await? {
            if include.matches(&file) && !excludes.iter().any(|exclude| exclude.matches(&file)) {
                matched.insert(file);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(matched.len());
    for file in matched {
        if !seen.insert(file.to_string_lossy().to_lowercase()) {
            tracing::info!(
                path = %file.display(),
                "Uploads are case insensitive: {} was detected that it will be ignored",
                file.display()
            );
            continue;
        }
        files.push(file);
    }

    let mut bases = Vec::with_capacity(includes.len());
    for include in &includes {
        bases.push(search_base(include.base()).await);
    }
    let root_directory = common_ancestor(&bases).unwrap_or_else(|| cwd.to_path_buf());
    tracing::debug!(root = %root_directory.display(), files = files.len(), "Search complete");
    Ok(SearchResult { files, root_directory })
}

/// A literal file contributes its parent directory, anything else itself.
async fn search_base(base: &Path) -> PathBuf {
    match tokio::fs::metadata(base).await {
        Ok(metadata) if metadata.is_file() => base.parent().unwrap_or(base).to_path_buf(),
        _ => base.to_path_buf(),
    }
}

fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut ancestor = first.clone();
    for path in rest {
        while !path.starts_with(&ancestor) {
            if !ancestor.pop() {
                break;
            }
        }
    }
    Some(ancestor)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    /// A workspace with:
    /// - `dist/app.bin`, `dist/app.txt`, `dist/sub/notes.txt`, `dist/.secret`
    /// - `logs/run.log`, `logs/run.tmp`
    /// - `.hidden/inner.txt`
    fn workspace() -> TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        for (file, contents) in [
            ("dist/app.bin", "bin"),
            ("dist/app.txt", "txt"),
            ("dist/sub/notes.txt", "notes"),
            ("dist/.secret", "shh"),
            ("logs/run.log", "log"),
            ("logs/run.tmp", "tmp"),
            (".hidden/inner.txt", "inner"),
        ] {
            let path = root.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        temp_dir
    }

    async fn relative(search_path: &str, include_hidden_files: bool) -> (Vec<String>, PathBuf) {
        let temp_dir = workspace();
        let root = temp_dir.path();
        let result = discover(search_path, root, DiscoverOptions { include_hidden_files }).await.unwrap();
        let files = result
            .files
            .iter()
            .map(|file| file.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();
        let root_directory = result.root_directory.strip_prefix(root).unwrap().to_path_buf();
        (files, root_directory)
    }

    #[rstest]
    #[case("dist/app.txt", &["dist/app.txt"], "dist")]
    #[case("dist", &["dist/app.bin", "dist/app.txt", "dist/sub/notes.txt"], "dist")]
    #[case("dist/*.txt", &["dist/app.txt"], "dist")]
    #[case("**/*.txt", &["dist/app.txt", "dist/sub/notes.txt"], "")]
    #[case("dist/app.txt\nlogs/run.log", &["dist/app.txt", "logs/run.log"], "")]
    #[case("logs/\n!logs/*.tmp", &["logs/run.log"], "logs")]
    #[case("dist\n!dist/sub", &["dist/app.bin", "dist/app.txt"], "dist")]
    #[case("# comment\n\n  dist/app.bin  \n", &["dist/app.bin"], "dist")]
    #[case("missing/*.txt", &[], "missing")]
    #[tokio::test]
    async fn test_discover(#[case] search_path: &str, #[case] expected: &[&str], #[case] root: &str) {
        let (files, root_directory) = relative(search_path, false).await;
        assert_eq!(files, expected);
        assert_eq!(root_directory, Path::new(root));
    }

    #[tokio::test]
    async fn test_discover_hidden() {
        // Naming a hidden directory explicitly still searches it.
        let (files, root) = relative("dist\n.hidden", false).await;
        assert_eq!(files, [".hidden/inner.txt", "dist/app.bin", "dist/app.txt", "dist/sub/notes.txt"]);
        assert_eq!(root, Path::new(""));
        let (files, _) = relative("**/*.txt", true).await;
        assert_eq!(files, [".hidden/inner.txt", "dist/app.txt", "dist/sub/notes.txt"]);
        let (files, _) = relative("dist", true).await;
        assert!(files.contains(&"dist/.secret".to_string()));
    }

    #[tokio::test]
    async fn test_discover_overlapping_patterns_deduplicated() {
        let (files, _) = relative("dist\ndist/*.txt\ndist/app.txt", false).await;
        assert_eq!(files, ["dist/app.bin", "dist/app.txt", "dist/sub/notes.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_discover_case_insensitive_duplicates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("README.md"), b"upper").unwrap();
        std::fs::write(root.join("readme.md"), b"lower").unwrap();
        let result = discover(".", root, DiscoverOptions::default()).await.unwrap();
        assert_eq!(result.files, [root.join("README.md")]);
    }

    #[tokio::test]
    async fn test_discover_invalid_pattern() {
        let err = discover("dist/[oops", Path::new("/"), DiscoverOptions::default()).await.unwrap_err();
        assert!(matches!(&*err, error::ErrorKind::InvalidPattern(_)));
    }

    #[test]
    fn test_common_ancestor() {
        let paths = [PathBuf::from("/a/b/c"), PathBuf::from("/a/b/d/e"), PathBuf::from("/a/bc")];
        assert_eq!(common_ancestor(&paths), Some(PathBuf::from("/a")));
        assert_eq!(common_ancestor(&paths[..1]), Some(PathBuf::from("/a/b/c")));
        assert_eq!(common_ancestor(&[]), None);
    }
}
