use crate::audio::{FfmpegTranscoder, MediaFile};
use crate::config::DEFAULT_CHUNK_MINUTES;
use crate::download::{download, DownloadMode, DownloadRequest};
use crate::error::{Result, YtsplitError};
use crate::output::{place_file, WorkDir};
use crate::split::{SplitOutcome, SplitState, Splitter};
use crate::tools::{resolve_tool, YT_DLP};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for one download-and-split run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    /// Directory receiving the final file(s).
    pub output_dir: PathBuf,
    pub mode: DownloadMode,
    /// Skip splitting even in audio mode.
    pub no_split: bool,
    pub chunk_minutes: u32,
    /// Directory searched first for external tools.
    pub tool_dir: Option<PathBuf>,
    pub verbose: bool,
    /// Show progress bars.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_dir: PathBuf::from("."),
            mode: DownloadMode::Audio,
            no_split: false,
            chunk_minutes: DEFAULT_CHUNK_MINUTES,
            tool_dir: None,
            verbose: false,
            show_progress: true,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub title: String,
    /// Files left in the output directory, in order.
    pub files: Vec<PathBuf>,
    pub split: Option<SplitOutcome>,
    /// Non-fatal problems worth reporting.
    pub warnings: Vec<String>,
    pub total_time: Duration,
}

/// Download the URL, place it in the output directory and split it.
///
/// Fails only when nothing usable was produced: a missing yt-dlp, a failed
/// download or a failed copy. Split problems are reported in the result.
pub async fn run(config: &PipelineConfig) -> Result<PipelineResult> {
    let start_time = Instant::now();
    let tool_dir = config.tool_dir.as_deref();
    let mut warnings = Vec::new();

    let yt_dlp = resolve_tool(YT_DLP, tool_dir).require(YT_DLP)?;
    let transcoder = FfmpegTranscoder::locate(tool_dir);
    let ffmpeg_location = match transcoder {
        Ok(ref t) => t.ffmpeg_dir().map(Path::to_path_buf),
        Err(ref e) => {
            warn!("{}, yt-dlp will use its own lookup", e);
            None
        }
    };

    fs::create_dir_all(&config.output_dir).map_err(|e| {
        YtsplitError::Copy(format!(
            "Failed to create output directory {}: {e}",
            config.output_dir.display()
        ))
    })?;
    info!("Target folder: {}", config.output_dir.display());

    let work_dir = WorkDir::create_in(&config.output_dir)?;

    let request = DownloadRequest {
        url: config.url.clone(),
        work_dir: work_dir.path().to_path_buf(),
        mode: config.mode,
        ffmpeg_location,
        verbose: config.verbose,
        show_progress: config.show_progress,
    };

    let placed = match download(&yt_dlp, &request).await {
        Ok(media) => place_file(&media.path, &config.output_dir).map(|path| (media.title, path)),
        Err(e) => Err(e),
    };

    if let Err(e) = work_dir.close() {
        warn!("{}", e);
        warnings.push(e.to_string());
    }

    let (title, final_path) = placed?;
    info!("Saved to {}", final_path.display());

    let media = MediaFile::new(final_path);
    let split = if !config.mode.is_audio() || config.no_split {
        debug!("Splitting disabled for this run");
        None
    } else if !media.format.is_audio() {
        warn!("Not splitting {}: not an audio file", media.path.display());
        None
    } else {
        split_file(&media.path, transcoder, config, &mut warnings).await
    };

    let files = match split {
        Some(ref outcome) => outcome.files.clone(),
        None => vec![media.path],
    };

    Ok(PipelineResult {
        title,
        files,
        split,
        warnings,
        total_time: start_time.elapsed(),
    })
}

async fn split_file(
    path: &Path,
    transcoder: Result<FfmpegTranscoder>,
    config: &PipelineConfig,
    warnings: &mut Vec<String>,
) -> Option<SplitOutcome> {
    let transcoder = match transcoder {
        Ok(t) => t,
        Err(e) => {
            warn!("Not splitting: {}", e);
            warnings.push(e.to_string());
            return None;
        }
    };

    let outcome = Splitter::new(transcoder)
        .with_progress(config.show_progress)
        .split(path, config.chunk_minutes)
        .await;

    if let Some(ref e) = outcome.probe_error {
        warnings.push(e.to_string());
    }
    warnings.extend(outcome.failures.iter().map(|e| e.to_string()));
    if let Some(ref e) = outcome.cleanup_error {
        warnings.push(e.to_string());
    }

    Some(outcome)
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("{}", style("═══ Download Complete ═══").bold());
    println!("  Title:    {}", style(&result.title).cyan());

    if let Some(ref split) = result.split {
        let status = match split.state {
            SplitState::Split => format!(
                "{} of {} chunks",
                split.files.len(),
                split.planned_chunks
            ),
            SplitState::NotNeeded => "not needed".to_string(),
            SplitState::ProbeFailed => "skipped (duration unreadable)".to_string(),
            SplitState::AllChunksFailed => "failed, original kept".to_string(),
        };
        println!("  Split:    {}", status);
    }

    println!("  Files:");
    for file in &result.files {
        println!("    {}", style(file.display()).green());
    }
    println!("  Time:     {:.2}s", result.total_time.as_secs_f64());

    if !result.warnings.is_empty() {
        println!();
        for warning in &result.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.mode, DownloadMode::Audio);
        assert_eq!(config.chunk_minutes, 35);
        assert!(!config.no_split);
        assert!(config.show_progress);
    }

    #[tokio::test]
    async fn test_run_without_yt_dlp() {
        let empty = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        if resolve_tool(YT_DLP, None) != crate::tools::ToolLocation::NotFound {
            eprintln!("Skipping test: yt-dlp is installed");
            return;
        }

        let config = PipelineConfig {
            url: "https://youtu.be/abc".to_string(),
            output_dir: out.path().to_path_buf(),
            tool_dir: Some(empty.path().to_path_buf()),
            show_progress: false,
            ..Default::default()
        };

        match run(&config).await {
            Err(YtsplitError::ToolNotFound(msg)) => assert!(msg.contains("yt-dlp")),
            other => panic!("Expected ToolNotFound, got {other:?}"),
        }
    }
}
