//! Atomic durable writes (write-to-temp, then rename)

use crate::io::error::IoError;
use std::path::Path;

/// Write `contents` to `path` durably: write to a sibling `.tmp` file, flush,
/// then rename over the destination. A crash mid-write leaves the original
/// file untouched since the rename is the only operation that mutates `path`.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), IoError> {
    let tmp_path = path.with_extension("tmp");

    std::fs::write(&tmp_path, contents).map_err(|e| IoError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| IoError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
