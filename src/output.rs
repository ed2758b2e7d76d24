//! Placement of downloaded files: the temporary working directory and
//! collision-free final paths.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Result, YtsplitError};

pub const WORK_DIR_PREFIX: &str = "yt_temp_";

pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Temporary download directory `yt_temp_<unix timestamp>` inside the output
/// directory.
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    pub fn create_in(parent: &Path) -> Result<Self> {
        let mut stamp = unix_timestamp();
        loop {
            let name = format!("{WORK_DIR_PREFIX}{stamp}");
            match tempfile::Builder::new()
                .prefix(&name)
                .rand_bytes(0)
                .tempdir_in(parent)
            {
                Ok(dir) => {
                    debug!("Using work directory {}", dir.path().display());
                    return Ok(Self { dir });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => stamp += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything left in it.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            YtsplitError::Cleanup(format!("Failed to remove {}: {e}", path.display()))
        })
    }
}

/// `dir/file_name`, or `dir/<stem>_<unix timestamp><.ext>` when that
/// already exists. The returned path does not exist at call time.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut stamp = unix_timestamp();
    loop {
        let candidate = dir.join(format!("{stem}_{stamp}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        stamp += 1;
    }
}

/// Copy `source` into `dir` under a collision-free name.
pub fn place_file(source: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| YtsplitError::Copy(format!("{} has no file name", source.display())))?;

    let destination = unique_destination(dir, &file_name);
    std::fs::copy(source, &destination).map_err(|e| {
        YtsplitError::Copy(format!(
            "Failed to copy {} to {}: {e}",
            source.display(),
            destination.display()
        ))
    })?;

    debug!("Copied {} to {}", source.display(), destination.display());
    Ok(destination)
}
