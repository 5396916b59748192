//! Shared value types passed across the [`crate::project::ProjectModel`] seam.

use serde::{Deserialize, Serialize};

/// Where a resolved library's bytes came from, per the three-tier fallback
/// in spec §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibrarySource {
    VersionedFs,
    UserRoot,
    GlobalRoot,
}

/// A resolved reference to a test/suite/EP file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Present when the source carries a versioned-FS marker (spec §4.6,
    /// `download_file`'s revision sentinel annotation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl FileRef {
    pub fn plain(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_id: None,
            revision: None,
        }
    }
}
