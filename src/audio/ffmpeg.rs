use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::tools::{resolve_tool, FFMPEG, FFPROBE};

use super::{extract, probe, ChunkSpec, Transcoder};

/// Transcoder backed by the ffmpeg and ffprobe executables.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Resolve both executables, failing with `ToolNotFound` if either is missing.
    pub fn locate(tool_dir: Option<&Path>) -> Result<Self> {
        let ffmpeg = resolve_tool(FFMPEG, tool_dir).require(FFMPEG)?;
        let ffprobe = resolve_tool(FFPROBE, tool_dir).require(FFPROBE)?;
        Ok(Self::new(ffmpeg, ffprobe))
    }

    /// Directory containing ffmpeg, as yt-dlp's `--ffmpeg-location` expects.
    pub fn ffmpeg_dir(&self) -> Option<&Path> {
        self.ffmpeg.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe_duration(&self, input: &Path) -> Result<f64> {
        probe::probe_duration(&self.ffprobe, input).await
    }

    async fn extract_chunk(
        &self,
        source: &Path,
        chunk: &ChunkSpec,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        extract::extract_chunk(&self.ffmpeg, source, chunk, output_dir).await
    }

    fn name(&self) -> &'static str {
        "FFmpeg"
    }
}
