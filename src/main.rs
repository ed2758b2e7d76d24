use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use ytsplit::config::{Config, Quality};
use ytsplit::download::DownloadMode;
use ytsplit::pipeline::{print_summary, run, PipelineConfig};
use ytsplit::source::resolve_url;

#[derive(Parser)]
#[command(name = "ytsplit")]
#[command(version, about = "Download videos as MP3 and split them into chunks")]
#[command(long_about = "Download a video with yt-dlp, convert it to MP3 and split long audio into fixed-length chunks with FFmpeg.")]
struct Cli {
    /// Video URL (defaults to the first URL in the companion URL file)
    url: Option<String>,

    /// Output directory (defaults to the Downloads folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Video quality: best, 1080p, 720p, 480p, 360p, 240p, 144p
    #[arg(short, long)]
    quality: Option<String>,

    /// Download audio only as MP3 (the default)
    #[arg(short, long, conflicts_with = "video")]
    audio_only: bool,

    /// Download video as MP4 instead of audio
    #[arg(short, long)]
    video: bool,

    /// Keep the audio as a single file
    #[arg(long)]
    no_split: bool,

    /// Chunk length in minutes
    #[arg(long)]
    chunk_minutes: Option<u32>,

    /// File to read a URL from when none is given
    #[arg(long)]
    url_file: Option<PathBuf>,

    /// Directory searched first for ffmpeg, ffprobe and yt-dlp
    #[arg(long)]
    tool_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn download_mode(cli: &Cli, config: &Config) -> DownloadMode {
    // Invalid levels warn and fall back to best even when unused
    let quality = cli
        .quality
        .as_deref()
        .map(Quality::parse_or_best)
        .unwrap_or(config.default_quality);

    if cli.audio_only || !cli.video {
        return DownloadMode::Audio;
    }
    DownloadMode::Video(quality)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load configuration, then apply CLI overrides
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(ref dir) = cli.output {
        config.output_dir = dir.clone();
    }
    if let Some(ref dir) = cli.tool_dir {
        config.tool_dir = Some(dir.clone());
    }
    if let Some(minutes) = cli.chunk_minutes {
        config.chunk_minutes = minutes;
    }
    if let Some(ref path) = cli.url_file {
        config.url_file = Some(path.clone());
    }
    config.validate().context("Configuration validation failed")?;

    let url = resolve_url(cli.url.as_deref(), &config.url_file_path())
        .context("No URL to download")?;

    let mode = download_mode(&cli, &config);
    if !cli.video && cli.quality.is_some() {
        info!("Quality only applies to video downloads, ignoring it");
    }

    info!("URL:      {}", url);
    info!("Output:   {}", config.output_dir.display());
    match mode {
        DownloadMode::Audio if cli.no_split => info!("Mode:     audio (MP3, no split)"),
        DownloadMode::Audio => info!(
            "Mode:     audio (MP3, {} min chunks)",
            config.chunk_minutes
        ),
        DownloadMode::Video(quality) => info!("Mode:     video (MP4, {})", quality),
    }

    let pipeline_config = PipelineConfig {
        url,
        output_dir: config.output_dir.clone(),
        mode,
        no_split: cli.no_split,
        chunk_minutes: config.chunk_minutes,
        tool_dir: config.tool_dir.clone(),
        verbose: cli.verbose,
        show_progress: true,
    };

    let result = run(&pipeline_config).await.context("Download failed")?;
    print_summary(&result);

    Ok(())
}
