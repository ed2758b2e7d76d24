use crate::error::{Result, YtsplitError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default length of a split chunk, in minutes.
pub const DEFAULT_CHUNK_MINUTES: u32 = 35;

/// Name of the companion file holding a fallback URL.
pub const DEFAULT_URL_FILE: &str = "youtube_url.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "144p")]
    P144,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.height() {
            Some(height) => write!(f, "{}p", height),
            None => write!(f, "best"),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "1080p" => Ok(Quality::P1080),
            "720p" => Ok(Quality::P720),
            "480p" => Ok(Quality::P480),
            "360p" => Ok(Quality::P360),
            "240p" => Ok(Quality::P240),
            "144p" => Ok(Quality::P144),
            _ => Err(format!(
                "Unknown quality: {}. Use best, 1080p, 720p, 480p, 360p, 240p or 144p",
                s
            )),
        }
    }
}

impl Quality {
    /// Maximum video height, or `None` for no limit.
    pub fn height(&self) -> Option<u32> {
        match self {
            Quality::Best => None,
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
            Quality::P240 => Some(240),
            Quality::P144 => Some(144),
        }
    }

    /// Parse a quality level, falling back to `Best` with a warning.
    pub fn parse_or_best(s: &str) -> Quality {
        match s.parse() {
            Ok(quality) => quality,
            Err(_) => {
                warn!("Invalid quality: {}. Using 'best' instead.", s);
                Quality::Best
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where final files land. Defaults to the user's download folder.
    pub output_dir: PathBuf,
    /// Directory searched first for ffmpeg, ffprobe and yt-dlp.
    pub tool_dir: Option<PathBuf>,
    pub chunk_minutes: u32,
    #[serde(deserialize_with = "lenient_quality")]
    pub default_quality: Quality,
    /// Base for the default companion URL file.
    pub base_dir: Option<PathBuf>,
    pub url_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tool_dir: None,
            chunk_minutes: DEFAULT_CHUNK_MINUTES,
            default_quality: Quality::default(),
            base_dir: None,
            url_file: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("downloads"))
}

fn lenient_quality<'de, D>(deserializer: D) -> std::result::Result<Quality, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Quality::parse_or_best(&value))
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = Self::from_toml(&contents)?;
                debug!("Loaded config from {}", config_path.display());
            }
        }

        // Override with environment variables
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Apply `YTSPLIT_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("YTSPLIT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("YTSPLIT_TOOL_DIR") {
            self.tool_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("YTSPLIT_BASE_DIR") {
            self.base_dir = Some(PathBuf::from(dir));
        }
        if let Some(minutes) = lookup("YTSPLIT_CHUNK_MINUTES") {
            self.chunk_minutes = minutes.trim().parse().map_err(|_| {
                YtsplitError::Config(format!(
                    "YTSPLIT_CHUNK_MINUTES must be a whole number of minutes, got {minutes:?}"
                ))
            })?;
        }
        Ok(())
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_minutes == 0 {
            return Err(YtsplitError::Config(
                "chunk_minutes must be greater than 0".to_string(),
            ));
        }

        if let Some(ref dir) = self.tool_dir {
            if !dir.is_dir() {
                return Err(YtsplitError::Config(format!(
                    "tool_dir is not a directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Companion file consulted when no URL is given on the command line.
    pub fn url_file_path(&self) -> PathBuf {
        if let Some(ref path) = self.url_file {
            return path.clone();
        }
        let base = self
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(DEFAULT_URL_FILE)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ytsplit").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parsing() {
        assert_eq!("best".parse::<Quality>().unwrap(), Quality::Best);
        assert_eq!("720p".parse::<Quality>().unwrap(), Quality::P720);
        assert_eq!("1080P".parse::<Quality>().unwrap(), Quality::P1080);
        assert!("4k".parse::<Quality>().is_err());
    }

    #[test]
    fn test_quality_fallback() {
        assert_eq!(Quality::parse_or_best("4k"), Quality::Best);
        assert_eq!(Quality::parse_or_best("144p"), Quality::P144);
    }

    #[test]
    fn test_quality_display() {
        assert_eq!(Quality::Best.to_string(), "best");
        assert_eq!(Quality::P480.to_string(), "480p");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_minutes, 35);
        assert_eq!(config.default_quality, Quality::Best);
        assert!(config.tool_dir.is_none());
    }

    #[test]
    fn test_validate_zero_chunk_minutes() {
        let config = Config {
            chunk_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_file_path_from_base_dir() {
        let config = Config {
            base_dir: Some(PathBuf::from("/srv/ytsplit")),
            ..Default::default()
        };
        assert_eq!(
            config.url_file_path(),
            PathBuf::from("/srv/ytsplit/youtube_url.txt")
        );

        let config = Config {
            url_file: Some(PathBuf::from("/tmp/urls.txt")),
            ..config
        };
        assert_eq!(config.url_file_path(), PathBuf::from("/tmp/urls.txt"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml("chunk_minutes = 10\ndefault_quality = \"720p\"\n").unwrap();
        assert_eq!(config.chunk_minutes, 10);
        assert_eq!(config.default_quality, Quality::P720);
    }

    #[test]
    fn test_from_toml_malformed_is_error() {
        let result = Config::from_toml("chunk_minutes = \"ten\"\n");
        assert!(matches!(result, Err(YtsplitError::Toml(_))));

        let result = Config::from_toml("output_dir = [unclosed\n");
        assert!(matches!(result, Err(YtsplitError::Toml(_))));
    }

    #[test]
    fn test_from_toml_bad_quality_keeps_rest() {
        let config =
            Config::from_toml("output_dir = \"/data/media\"\ndefault_quality = \"4k\"\n").unwrap();
        assert_eq!(config.default_quality, Quality::Best);
        assert_eq!(config.output_dir, PathBuf::from("/data/media"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "YTSPLIT_OUTPUT_DIR" => Some("/srv/out".to_string()),
                "YTSPLIT_CHUNK_MINUTES" => Some("20".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/srv/out"));
        assert_eq!(config.chunk_minutes, 20);
        assert!(config.tool_dir.is_none());
    }

    #[test]
    fn test_env_bad_chunk_minutes_is_error() {
        let mut config = Config::default();
        let result = config.apply_env(|key| {
            (key == "YTSPLIT_CHUNK_MINUTES").then(|| "forty".to_string())
        });

        assert!(matches!(result, Err(YtsplitError::Config(_))));
        assert_eq!(config.chunk_minutes, DEFAULT_CHUNK_MINUTES);
    }
}
