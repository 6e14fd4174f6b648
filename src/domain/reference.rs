use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Names a document to be parsed.
///
/// References compare by value. A reference built with [`Self::new`] is used
/// exactly as given; only [`Self::resolve`] tidies up `.` and `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentReference(PathBuf);

impl DocumentReference {
    /// Creates a reference from anything path-like.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The underlying filesystem path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The directory a relative link inside this document is resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.0.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Resolves a link found inside this document.
    ///
    /// Absolute links replace the base directory entirely. `.` and `..`
    /// segments are folded lexically, without touching the filesystem, so a
    /// back link such as `../top.htm` names the same reference as the
    /// document it points at.
    #[must_use]
    pub fn resolve(&self, link: &str) -> Self {
        let mut resolved = PathBuf::new();
        for component in self.base_dir().join(link).components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match resolved.components().next_back() {
                    Some(Component::Normal(_)) => {
                        resolved.pop();
                    }
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    _ => resolved.push(".."),
                },
                other => resolved.push(other),
            }
        }
        Self(resolved)
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for DocumentReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for DocumentReference {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

impl AsRef<Path> for DocumentReference {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
