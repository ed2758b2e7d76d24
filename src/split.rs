use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::audio::{plan_chunks, Transcoder};
use crate::config::DEFAULT_CHUNK_MINUTES;
use crate::error::YtsplitError;

/// How a split run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    /// Duration could not be read; the file was left whole.
    ProbeFailed,
    /// The file fits in a single chunk.
    NotNeeded,
    /// At least one chunk was written and the original removed.
    Split,
    /// Every chunk failed; the original was kept.
    AllChunksFailed,
}

/// Terminal report of [`Splitter::split`].
#[derive(Debug)]
pub struct SplitOutcome {
    pub state: SplitState,
    /// Output files in chunk order, or the untouched original.
    pub files: Vec<PathBuf>,
    pub duration_seconds: Option<f64>,
    pub planned_chunks: usize,
    pub failures: Vec<YtsplitError>,
    pub probe_error: Option<YtsplitError>,
    pub cleanup_error: Option<YtsplitError>,
    pub elapsed: Duration,
}

impl SplitOutcome {
    fn unsplit(file: &Path, state: SplitState, started: Instant) -> Self {
        Self {
            state,
            files: vec![file.to_path_buf()],
            duration_seconds: None,
            planned_chunks: 0,
            failures: Vec::new(),
            probe_error: None,
            cleanup_error: None,
            elapsed: started.elapsed(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
            || self.probe_error.is_some()
            || self.cleanup_error.is_some()
    }
}

/// Splits an audio file into fixed-length chunks, one at a time.
pub struct Splitter<T: Transcoder> {
    transcoder: T,
    show_progress: bool,
}

impl<T: Transcoder> Splitter<T> {
    pub fn new(transcoder: T) -> Self {
        Self {
            transcoder,
            show_progress: false,
        }
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Split with the default 35 minute chunk length.
    pub async fn split_default(&self, file: &Path) -> SplitOutcome {
        self.split(file, DEFAULT_CHUNK_MINUTES).await
    }

    /// Probe, plan, extract each chunk in order, then remove the original
    /// if anything was produced. Never fails: degradations are reported in
    /// the returned outcome.
    pub async fn split(&self, file: &Path, chunk_minutes: u32) -> SplitOutcome {
        let started = Instant::now();

        let duration = match self.transcoder.probe_duration(file).await {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    "Could not read duration of {}, keeping it whole: {}",
                    file.display(),
                    e
                );
                let mut outcome = SplitOutcome::unsplit(file, SplitState::ProbeFailed, started);
                outcome.probe_error = Some(e);
                return outcome;
            }
        };

        let plan = plan_chunks(duration, chunk_minutes);
        if plan.is_empty() {
            info!(
                "{} is {:.1} min, no split needed (chunk length {} min)",
                file.display(),
                duration / 60.0,
                chunk_minutes
            );
            let mut outcome = SplitOutcome::unsplit(file, SplitState::NotNeeded, started);
            outcome.duration_seconds = Some(duration);
            return outcome;
        }

        let output_dir = file.parent().unwrap_or_else(|| Path::new("."));
        let total_chunks = plan.len();

        info!(
            "Splitting {} ({:.1} min) into {} chunks of {} min using {}",
            file.display(),
            duration / 60.0,
            total_chunks,
            chunk_minutes,
            self.transcoder.name()
        );

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(total_chunks as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut files = Vec::with_capacity(total_chunks);
        let mut failures = Vec::new();

        for chunk in &plan {
            match self
                .transcoder
                .extract_chunk(file, chunk, output_dir)
                .await
            {
                Ok(path) => {
                    debug!("Chunk {}/{} written to {}", chunk.index, total_chunks, path.display());
                    files.push(path);
                }
                Err(e) => {
                    warn!("Chunk {}/{} failed, skipping: {}", chunk.index, total_chunks, e);
                    failures.push(e);
                }
            }

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Split complete");
        }

        if files.is_empty() {
            warn!(
                "All {} chunks failed, keeping {} whole",
                total_chunks,
                file.display()
            );
            let mut outcome = SplitOutcome::unsplit(file, SplitState::AllChunksFailed, started);
            outcome.duration_seconds = Some(duration);
            outcome.planned_chunks = total_chunks;
            outcome.failures = failures;
            return outcome;
        }

        let cleanup_error = match std::fs::remove_file(file) {
            Ok(()) => {
                debug!("Removed original {}", file.display());
                None
            }
            Err(e) => {
                warn!("Could not remove original {}: {}", file.display(), e);
                Some(YtsplitError::Cleanup(format!(
                    "Failed to remove {}: {e}",
                    file.display()
                )))
            }
        };

        info!(
            "Split complete: {}/{} chunks written in {:.2}s",
            files.len(),
            total_chunks,
            started.elapsed().as_secs_f64()
        );

        SplitOutcome {
            state: SplitState::Split,
            files,
            duration_seconds: Some(duration),
            planned_chunks: total_chunks,
            failures,
            probe_error: None,
            cleanup_error,
            elapsed: started.elapsed(),
        }
    }
}
