use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, YtsplitError};
use crate::tools::stderr_tail;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe prints numbers as strings in its JSON writer
    duration: Option<serde_json::Value>,
}

/// Get media duration in seconds using FFprobe's JSON output.
pub async fn probe_duration(ffprobe: &Path, input: &Path) -> Result<f64> {
    if !input.exists() {
        return Err(YtsplitError::Probe(format!(
            "{} does not exist",
            input.display()
        )));
    }

    let output = Command::new(ffprobe)
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(input)
        .output()
        .await
        .map_err(|e| YtsplitError::Probe(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        return Err(YtsplitError::Probe(format!(
            "FFprobe exited with {}: {}",
            output.status,
            stderr_tail(&output.stderr)
        )));
    }

    let duration = parse_probe_output(&output.stdout)?;
    debug!("{} is {:.3}s long", input.display(), duration);
    Ok(duration)
}

/// Extract `format.duration` from FFprobe JSON.
pub fn parse_probe_output(stdout: &[u8]) -> Result<f64> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| YtsplitError::Probe(format!("FFprobe output is not valid JSON: {e}")))?;

    let value = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| YtsplitError::Probe("FFprobe output has no format.duration".to_string()))?;

    let duration = match &value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| YtsplitError::Probe(format!("Duration is not numeric: {value}")))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(YtsplitError::Probe(format!(
            "Duration out of range: {duration}"
        )));
    }

    Ok(duration)
}
