//! Path-derived template fields.

use std::path::Path;

/// A recognized template placeholder.
///
/// The set is closed: anything else inside `${...}` is left untouched by the
/// [`NameTemplate`](crate::NameTemplate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// The effective base directory (workspace directory, or the parent of
    /// the discovered root directory).
    Root,
    /// Path from `root` to the directory containing the file.
    Dir,
    /// File name including its extension.
    Base,
    /// File name without its extension.
    Name,
    /// Extension including the leading `.` (empty when there is none).
    Ext,
}
impl Field {
    /// Every field, in the fixed order they are documented and substituted.
    pub const ALL: [Field; 5] = [Field::Root, Field::Dir, Field::Base, Field::Name, Field::Ext];

    /// The placeholder key, as written between `${` and `}`.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Field::Root => "root",
            Field::Dir => "dir",
            Field::Base => "base",
            Field::Name => "name",
            Field::Ext => "ext",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Template values for a single file.
///
/// Recomputed for every file in a batch; nothing is shared between files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathFields {
    pub root: String,
    pub dir: String,
    pub base: String,
    pub name: String,
    pub ext: String,
}
impl PathFields {
    /// Derive the fields of `file` relative to `root`.
    ///
    /// `dir` is the file's parent directory relative to `root` (empty when the
    /// file sits directly inside `root`). A file outside of `root` keeps its
    /// full parent directory as `dir`; sanitization flattens it later.
    pub fn derive(file: &Path, root: &Path) -> Self {
        let lossy = |s: &std::ffi::OsStr| s.to_string_lossy().into_owned();
        let base = file.file_name().map(lossy).unwrap_or_default();
        let name = file.file_stem().map(lossy).unwrap_or_default();
        let ext = file.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default();
        let parent = file.parent().unwrap_or(Path::new(""));
        let dir = match parent.strip_prefix(root) {
            Ok(relative) => relative.to_string_lossy().into_owned(),
            Err(_) => {
                tracing::debug!(file = %file.display(), root = %root.display(), "File is outside of the naming root");
                parent.to_string_lossy().into_owned()
            },
        };
        Self {
            root: root.to_string_lossy().into_owned(),
            dir,
            base,
            name,
            ext,
        }
    }

    /// Accessor for a single [`Field`].
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Root => &self.root,
            Field::Dir => &self.dir,
            Field::Base => &self.base,
            Field::Name => &self.name,
            Field::Ext => &self.ext,
        }
    }
}
