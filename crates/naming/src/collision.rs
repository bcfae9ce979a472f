//! Collision resolution for artifact names assigned within one run.

use std::collections::HashSet;

/// Joins a file's batch index to a colliding name: `{index}__{name}`.
pub const INDEX_SEPARATOR: &str = "__";

/// Artifact names already assigned in the current run.
///
/// Grows monotonically and is dropped at the end of the run. The caller
/// [`resolve`](Self::resolve)s a candidate, uses the returned name, then
/// [`insert`](Self::insert)s it before moving on to the next file.
#[derive(Debug, Default)]
pub struct AssignedNames {
    lookup: HashSet<String>,
}
impl AssignedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `candidate` unchanged when it hasn't been assigned yet,
    /// otherwise prefixes it with the file's zero-based batch `index`.
    ///
    /// Batch indices are unique, so the prefixed name can only be taken when
    /// an earlier file literally rendered an index-prefixed name; in that case
    /// the prefix is applied again until the name is free. The candidates
    /// `["2__a", "a", "a"]` become `["2__a", "a", "2__2__a"]`, where a single
    /// prefix would have handed out `2__a` twice.
    pub fn resolve(&self, candidate: String, index: usize) -> String {
        if !self.contains(&candidate) {
            return candidate;
        }
        tracing::warn!(name = %candidate, "Artifact name already exists in this run");
        let mut replacement = format!("{index}{INDEX_SEPARATOR}{candidate}");
        while self.contains(&replacement) {
            replacement = format!("{index}{INDEX_SEPARATOR}{replacement}");
        }
        tracing::warn!(original = %candidate, %replacement, "{candidate} => {replacement}");
        replacement
    }

    /// Records `name` as used. Returns `false` if it was already recorded.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.lookup.insert(name.into())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }
}
