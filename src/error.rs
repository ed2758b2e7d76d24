use thiserror::Error;

#[derive(Error, Debug)]
pub enum YtsplitError {
    #[error("Duration probe failed: {0}")]
    Probe(String),

    #[error("Chunk {index} extraction failed: {message}")]
    Extract { index: usize, message: String },

    #[error("Copy failed: {0}")]
    Copy(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("No URL available: {0}")]
    NoUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, YtsplitError>;
