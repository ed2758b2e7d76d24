use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, YtsplitError};

/// Domains accepted in the companion URL file.
pub const RECOGNIZED_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "music.youtube.com"];

/// First usable URL in `contents`: non-empty, not a `#` comment, and
/// mentioning a recognized domain.
pub fn find_url(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find(|line| RECOGNIZED_DOMAINS.iter().any(|d| line.contains(d)))
        .map(str::to_string)
}

/// Read a fallback URL from the companion file.
pub fn read_url_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(YtsplitError::NoUrl(format!(
            "no URL given and {} does not exist",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    find_url(&contents).ok_or_else(|| {
        YtsplitError::NoUrl(format!("{} contains no recognized URL", path.display()))
    })
}

/// Use the explicit URL if given, otherwise the companion file.
pub fn resolve_url(explicit: Option<&str>, url_file: &Path) -> Result<String> {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        debug!("Using URL from command line");
        return Ok(url.to_string());
    }

    let url = read_url_file(url_file)?;
    info!("Using URL from {}", url_file.display());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_url_skips_comments_and_blank_lines() {
        let contents = "\n# https://www.youtube.com/watch?v=commented\n\n  https://youtu.be/abc123  \nhttps://www.youtube.com/watch?v=second\n";
        assert_eq!(find_url(contents), Some("https://youtu.be/abc123".to_string()));
    }

    #[test]
    fn test_find_url_requires_known_domain() {
        assert_eq!(find_url("https://vimeo.com/1234\nnotes\n"), None);
        assert_eq!(
            find_url("https://vimeo.com/1234\nhttps://music.youtube.com/watch?v=x\n"),
            Some("https://music.youtube.com/watch?v=x".to_string())
        );
    }

    #[test]
    fn test_resolve_url_prefers_explicit() {
        let url = resolve_url(Some(" https://youtu.be/x "), Path::new("/nonexistent/urls.txt"));
        assert_eq!(url.unwrap(), "https://youtu.be/x");
    }

    #[test]
    fn test_resolve_url_missing_file() {
        let result = resolve_url(None, Path::new("/nonexistent/urls.txt"));
        assert!(matches!(result, Err(YtsplitError::NoUrl(_))));
    }

    #[test]
    fn test_read_url_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("youtube_url.txt");
        std::fs::write(&path, "# saved\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n").unwrap();

        assert_eq!(
            resolve_url(None, &path).unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
