pub mod chunk;
pub mod extract;
pub mod ffmpeg;
pub mod probe;

pub use chunk::{plan_chunks, ChunkSpec};
pub use extract::{chunk_file_name, chunk_output_path, extract_chunk};
pub use ffmpeg::FfmpegTranscoder;
pub use probe::{parse_probe_output, probe_duration};

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Container format inferred from a file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaFormat {
    Mp3,
    M4a,
    Mp4,
    Webm,
    Other(String),
}

impl MediaFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "mp3" => MediaFormat::Mp3,
            "m4a" => MediaFormat::M4a,
            "mp4" => MediaFormat::Mp4,
            "webm" => MediaFormat::Webm,
            _ => MediaFormat::Other(ext),
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, MediaFormat::Mp3 | MediaFormat::M4a)
    }
}

/// A media file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub format: MediaFormat,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = MediaFormat::from_path(&path);
        Self { path, format }
    }
}

/// The two transcoder operations the splitter depends on.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Total duration of `input` in seconds.
    async fn probe_duration(&self, input: &Path) -> Result<f64>;

    /// Stream-copy one planned chunk of `source` into `output_dir`.
    async fn extract_chunk(
        &self,
        source: &Path,
        chunk: &ChunkSpec,
        output_dir: &Path,
    ) -> Result<PathBuf>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_format_from_path() {
        assert_eq!(MediaFormat::from_path(Path::new("a/b.MP3")), MediaFormat::Mp3);
        assert_eq!(MediaFormat::from_path(Path::new("clip.webm")), MediaFormat::Webm);
        assert_eq!(
            MediaFormat::from_path(Path::new("noext")),
            MediaFormat::Other(String::new())
        );
        assert!(MediaFormat::M4a.is_audio());
        assert!(!MediaFormat::Mp4.is_audio());
    }

    #[test]
    fn test_media_file_new() {
        let file = MediaFile::new("/music/talk.mp3");
        assert_eq!(file.format, MediaFormat::Mp3);
        assert_eq!(file.path, PathBuf::from("/music/talk.mp3"));
    }
}
