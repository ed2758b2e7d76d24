//! Discovery of external executables (ffmpeg, ffprobe, yt-dlp).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, YtsplitError};

/// Installation directories checked after the configured tool directory.
pub const KNOWN_TOOL_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin", "/bin"];

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const YT_DLP: &str = "yt-dlp";

/// Result of looking up an executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    Found(PathBuf),
    NotFound,
}

impl ToolLocation {
    /// Turn a lookup into a reportable error when the tool is missing.
    pub fn require(self, name: &str) -> Result<PathBuf> {
        match self {
            ToolLocation::Found(path) => Ok(path),
            ToolLocation::NotFound => Err(YtsplitError::ToolNotFound(format!(
                "{name} was not found in the tool directory, {} or PATH",
                KNOWN_TOOL_DIRS.join(", ")
            ))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ToolLocation::Found(path) => Some(path),
            ToolLocation::NotFound => None,
        }
    }
}

/// Resolve `name` by checking `tool_dir`, then the known install directories,
/// then the `PATH`.
pub fn resolve_tool(name: &str, tool_dir: Option<&Path>) -> ToolLocation {
    resolve_tool_in(name, tool_dir, KNOWN_TOOL_DIRS)
}

pub(crate) fn resolve_tool_in(
    name: &str,
    tool_dir: Option<&Path>,
    known_dirs: &[&str],
) -> ToolLocation {
    let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);

    let candidates = tool_dir
        .into_iter()
        .map(Path::to_path_buf)
        .chain(known_dirs.iter().map(|d| PathBuf::from(*d)));

    for dir in candidates {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            debug!("Resolved {} to {}", name, candidate.display());
            return ToolLocation::Found(candidate);
        }
    }

    match which::which(name) {
        Ok(path) => {
            debug!("Resolved {} on PATH to {}", name, path.display());
            ToolLocation::Found(path)
        }
        Err(_) => ToolLocation::NotFound,
    }
}

/// Last few non-empty lines of a child's stderr, for error messages.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 5;

    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join(" | ")
}
