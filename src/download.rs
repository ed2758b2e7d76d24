use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Quality;
use crate::error::{Result, YtsplitError};
use crate::tools::stderr_tail;

/// Output template, relative to the work directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Printed once the file is in its final place.
const PRINT_TEMPLATE: &str = "after_move:%(.{title,filepath})j";

/// What to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Best audio, converted to MP3.
    Audio,
    /// Video and audio merged into MP4.
    Video(Quality),
}

impl DownloadMode {
    /// yt-dlp format selector.
    pub fn format_selector(&self) -> String {
        match self {
            DownloadMode::Audio => "bestaudio/best".to_string(),
            DownloadMode::Video(quality) => match quality.height() {
                Some(height) => format!("bestvideo[height<={height}]+bestaudio/best"),
                None => "bestvideo+bestaudio/best".to_string(),
            },
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, DownloadMode::Audio)
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub work_dir: PathBuf,
    pub mode: DownloadMode,
    /// Directory holding ffmpeg, passed as `--ffmpeg-location`.
    pub ffmpeg_location: Option<PathBuf>,
    pub verbose: bool,
    pub show_progress: bool,
}

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub title: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PrintedInfo {
    title: Option<String>,
    filepath: Option<String>,
}

/// Command-line arguments for yt-dlp.
pub fn build_args(request: &DownloadRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    args.push("--no-playlist".into());
    args.push("-f".into());
    args.push(request.mode.format_selector().into());

    match request.mode {
        DownloadMode::Audio => {
            args.extend(["-x", "--audio-format", "mp3"].map(OsString::from));
        }
        DownloadMode::Video(_) => {
            args.extend(["--merge-output-format", "mp4"].map(OsString::from));
        }
    }

    args.push("-o".into());
    args.push(request.work_dir.join(OUTPUT_TEMPLATE).into());

    if let Some(ref location) = request.ffmpeg_location {
        args.push("--ffmpeg-location".into());
        args.push(location.into());
    }

    if request.verbose {
        args.extend(["--progress", "--newline"].map(OsString::from));
    } else {
        args.extend(["--quiet", "--no-warnings"].map(OsString::from));
    }

    args.push("--print".into());
    args.push(PRINT_TEMPLATE.into());
    args.push(request.url.as_str().into());
    args
}

/// Parse the last printed JSON line into a download result.
pub fn parse_printed_info(stdout: &str) -> Option<DownloadedMedia> {
    stdout.lines().rev().find_map(|line| {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        let info: PrintedInfo = serde_json::from_str(line).ok()?;
        let path = PathBuf::from(info.filepath?);
        let title = info.title.unwrap_or_else(|| title_from_path(&path));
        Some(DownloadedMedia { title, path })
    })
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Most recently modified finished file in `dir`.
pub fn newest_file(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            !matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("part" | "ytdl" | "tmp")
            )
        })
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

/// Download `request.url` into the work directory with yt-dlp.
pub async fn download(yt_dlp: &Path, request: &DownloadRequest) -> Result<DownloadedMedia> {
    info!("Downloading from: {}", request.url);
    debug!("yt-dlp args: {:?}", build_args(request));

    let spinner = if request.show_progress && !request.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(if request.mode.is_audio() {
            "Downloading audio..."
        } else {
            "Downloading video..."
        });
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let stderr = if request.verbose {
        Stdio::inherit()
    } else {
        Stdio::piped()
    };

    let output = Command::new(yt_dlp)
        .args(build_args(request))
        .stdout(Stdio::piped())
        .stderr(stderr)
        .output()
        .await
        .map_err(|e| YtsplitError::Download(format!("Failed to run yt-dlp: {e}")));

    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }
    let output = output?;

    if !output.status.success() {
        let detail = stderr_tail(&output.stderr);
        return Err(YtsplitError::Download(if detail.is_empty() {
            format!("yt-dlp exited with {}", output.status)
        } else {
            format!("yt-dlp exited with {}: {detail}", output.status)
        }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(media) = parse_printed_info(&stdout) {
        if media.path.is_file() {
            info!("Downloaded \"{}\"", media.title);
            return Ok(media);
        }
        warn!(
            "yt-dlp reported {} but it does not exist, scanning work directory",
            media.path.display()
        );
    }

    let path = newest_file(&request.work_dir).ok_or_else(|| {
        YtsplitError::Download(format!(
            "yt-dlp finished but no file was found in {}",
            request.work_dir.display()
        ))
    })?;
    let title = title_from_path(&path);
    info!("Downloaded \"{}\"", title);
    Ok(DownloadedMedia { title, path })
}
