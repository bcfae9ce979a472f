use crate::error::{ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

pub(crate) type PathStream<'a> = Pin<Box<dyn Stream<Item = Result<PathBuf>> + Send + 'a>>;

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

async fn process_path(path: PathBuf, include_hidden: bool, visited: &mut HashSet<PathBuf>) -> Result<WalkEntry> {
    if !include_hidden && is_hidden(&path) {
        tracing::debug!(path = %path.display(), "Skipping hidden path");
        return Ok(WalkEntry::Skip);
    }
    // Follows symbolic links.
    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Skipping missing path or broken link");
            return Ok(WalkEntry::Skip);
        },
        Err(e) => exn::bail!(ErrorKind::from_io(e, &path)),
    };
    if metadata.is_dir() {
        let canonical = fs::canonicalize(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?;
        if !visited.insert(canonical) {
            tracing::debug!(path = %path.display(), "Skipping directory that was already visited");
            return Ok(WalkEntry::Skip);
        }
        return Ok(WalkEntry::Descend(path));
    }
    if metadata.is_file() {
        return Ok(WalkEntry::File(path));
    }
    Ok(WalkEntry::Skip)
}

/// Every file at or beneath `start`, depth-first, in no particular order.
///
/// A missing `start` yields nothing. `start` itself is never treated as hidden.
pub(crate) fn walk(start: PathBuf, include_hidden: bool) -> PathStream<'static> {
    Box::pin(stream! {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        match process_path(start, true, &mut visited).await {
            Ok(WalkEntry::File(file)) => yield Ok(file),
            Ok(WalkEntry::Descend(dir)) => stack.push(dir),
            Ok(WalkEntry::Skip) => {},
            Err(e) => yield Err(e),
        }

        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(e, &current)));
                    continue 'dirs;
                },
            };
            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => {
                        yield Err(exn::Exn::from(ErrorKind::from_io(e, &current)));
                        continue 'dirs;
                    },
                };
                match process_path(entry.path(), include_hidden, &mut visited).await {
                    Ok(WalkEntry::File(file)) => yield Ok(file),
                    Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}
