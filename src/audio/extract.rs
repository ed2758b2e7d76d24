use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, YtsplitError};
use crate::output::unique_destination;
use crate::tools::stderr_tail;

use super::ChunkSpec;

/// File name for chunk `index` of a source with stem `stem`.
pub fn chunk_file_name(stem: &str, index: usize) -> String {
    format!("{stem}_part{index:02}.mp3")
}

/// Output path for chunk `index` of `source`. Chunks left by an earlier run
/// are never reused: a taken name gets a unix timestamp suffix.
pub fn chunk_output_path(source: &Path, index: usize, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    unique_destination(output_dir, &chunk_file_name(&stem, index))
}

fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// FFmpeg arguments for a stream-copied chunk.
pub(crate) fn extract_args(source: &Path, chunk: &ChunkSpec, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-n", "-ss"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(format_seconds(chunk.start_seconds).into());
    args.push("-i".into());
    args.push(source.into());
    args.push("-t".into());
    args.push(format_seconds(chunk.length_seconds).into());
    args.extend(
        ["-c", "copy", "-avoid_negative_ts", "make_zero"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.into());
    args
}

/// Copy one chunk out of `source` without re-encoding.
pub async fn extract_chunk(
    ffmpeg: &Path,
    source: &Path,
    chunk: &ChunkSpec,
    output_dir: &Path,
) -> Result<PathBuf> {
    let output = chunk_output_path(source, chunk.index, output_dir);

    debug!(
        "Extracting chunk {}: start={:.3}s length={:.3}s -> {}",
        chunk.index,
        chunk.start_seconds,
        chunk.length_seconds,
        output.display()
    );

    let result = Command::new(ffmpeg)
        .args(extract_args(source, chunk, &output))
        .output()
        .await
        .map_err(|e| YtsplitError::Extract {
            index: chunk.index,
            message: format!("Failed to run FFmpeg: {e}"),
        })?;

    if !result.status.success() {
        return Err(YtsplitError::Extract {
            index: chunk.index,
            message: format!(
                "FFmpeg exited with {}: {}",
                result.status,
                stderr_tail(&result.stderr)
            ),
        });
    }

    if !output.exists() {
        return Err(YtsplitError::Extract {
            index: chunk.index,
            message: "Output file was not created".to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_file_name_padding() {
        assert_eq!(chunk_file_name("lecture", 1), "lecture_part01.mp3");
        assert_eq!(chunk_file_name("lecture", 12), "lecture_part12.mp3");
        assert_eq!(chunk_file_name("lecture", 100), "lecture_part100.mp3");
    }

    #[test]
    fn test_chunk_output_path_forces_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let path = chunk_output_path(Path::new("/in/My Talk.m4a"), 3, dir.path());
        assert_eq!(path, dir.path().join("My Talk_part03.mp3"));
    }

    #[test]
    fn test_chunk_output_path_skips_existing_chunk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Talk_part01.mp3"), b"earlier run").unwrap();

        let path = chunk_output_path(Path::new("Talk.mp3"), 1, dir.path());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(!path.exists());
        assert!(name.starts_with("Talk_part01_"));
        assert!(name.ends_with(".mp3"));
    }

    #[test]
    fn test_extract_args() {
        let chunk = ChunkSpec {
            index: 2,
            start_seconds: 2100.0,
            length_seconds: 1500.25,
        };
        let args = extract_args(Path::new("in.mp3"), &chunk, Path::new("in_part02.mp3"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-n",
                "-ss",
                "2100.000",
                "-i",
                "in.mp3",
                "-t",
                "1500.250",
                "-c",
                "copy",
                "-avoid_negative_ts",
                "make_zero",
                "in_part02.mp3",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_failure_captures_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("ffmpeg");
        std::fs::write(&tool, "#!/bin/sh\necho 'Invalid data found' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let chunk = ChunkSpec {
            index: 4,
            start_seconds: 0.0,
            length_seconds: 10.0,
        };
        let source = dir.path().join("song.mp3");

        match extract_chunk(&tool, &source, &chunk, dir.path()).await {
            Err(YtsplitError::Extract { index, message }) => {
                assert_eq!(index, 4);
                assert!(message.contains("Invalid data found"));
            }
            other => panic!("Expected Extract error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_repeated_extract_keeps_earlier_chunks() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("ffmpeg");
        // Copies the -i input to the last argument.
        std::fs::write(
            &tool,
            "#!/bin/sh\nwhile [ $# -gt 1 ]; do\n  if [ \"$1\" = \"-i\" ]; then in=\"$2\"; fi\n  shift\ndone\ncp \"$in\" \"$1\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let source = out_dir.join("Talk.mp3");
        let chunk = ChunkSpec {
            index: 1,
            start_seconds: 0.0,
            length_seconds: 2100.0,
        };

        std::fs::write(&source, b"FIRST RUN AUDIO").unwrap();
        let first = extract_chunk(&tool, &source, &chunk, &out_dir).await.unwrap();

        std::fs::write(&source, b"SECOND RUN AUDIO").unwrap();
        let second = extract_chunk(&tool, &source, &chunk, &out_dir).await.unwrap();

        assert_eq!(first, out_dir.join("Talk_part01.mp3"));
        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"FIRST RUN AUDIO");
        assert_eq!(std::fs::read(&second).unwrap(), b"SECOND RUN AUDIO");
    }
}
