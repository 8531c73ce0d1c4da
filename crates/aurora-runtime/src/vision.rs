//! `screenshot` and `vision_analyze`: desktop frame capture plus OCR.
//!
//! Grounded on `examples/original_source/aurora_pro/vision_agent.py`,
//! which captures with `mss` and OCRs with `pytesseract` (itself a thin
//! wrapper over the `tesseract` CLI binary). Rather than bind a heavy
//! screen-capture or OCR crate, both steps shell out to an existing CLI
//! tool — `scrot` for capture, `tesseract` for OCR — using the same
//! `tokio::process::Command` + wall-clock-timeout idiom as
//! `aurora-tools::cli_execute`. This keeps the crate out of the
//! not-reimplementing-an-OCR-kernel non-goal: the kernel is `tesseract`,
//! not us.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::action::ScreenRegion;
use crate::error::{RuntimeError, RuntimeResult};

const CAPTURE_TIMEOUT_SEC: u64 = 10;
const OCR_TIMEOUT_SEC: u64 = 15;

/// A detected UI element from the OCR layout heuristic.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UiElement {
    /// Recognized text.
    pub text: String,
    /// Left edge, in pixels.
    pub x: i32,
    /// Top edge, in pixels.
    pub y: i32,
    /// Width, in pixels.
    pub width: i32,
    /// Height, in pixels.
    pub height: i32,
    /// OCR confidence in `[0, 100]`.
    pub confidence: f32,
}

/// Capture the desktop (or `region`, if given) to `output_path` via the
/// `scrot` CLI.
///
/// # Errors
///
/// Returns [`RuntimeError::Vision`] if `scrot` is missing, times out, or
/// exits nonzero.
pub async fn capture_screen(output_path: &Path, region: Option<&ScreenRegion>) -> RuntimeResult<()> {
    let mut command = Command::new("scrot");
    if let Some(region) = region {
        command.arg("-a").arg(format!("{},{},{},{}", region.x, region.y, region.width, region.height));
    }
    command.arg("--overwrite").arg(output_path);

    run_capture_tool(command).await
}

async fn run_capture_tool(mut command: Command) -> RuntimeResult<()> {
    let output = tokio::time::timeout(Duration::from_secs(CAPTURE_TIMEOUT_SEC), command.output())
        .await
        .map_err(|_| RuntimeError::Vision("screen capture timed out".to_string()))?
        .map_err(|err| RuntimeError::Vision(err.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(RuntimeError::Vision(String::from_utf8_lossy(&output.stderr).into_owned()))
    }
}

/// Run `tesseract` over `image_path`, returning the recognized plain text.
///
/// # Errors
///
/// Returns [`RuntimeError::Vision`] if `tesseract` is missing, times out,
/// or exits nonzero.
pub async fn ocr_text(image_path: &Path) -> RuntimeResult<String> {
    let output = tokio::time::timeout(
        Duration::from_secs(OCR_TIMEOUT_SEC),
        Command::new("tesseract").arg(image_path).arg("stdout").output(),
    )
    .await
    .map_err(|_| RuntimeError::Vision("ocr timed out".to_string()))?
    .map_err(|err| RuntimeError::Vision(err.to_string()))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(RuntimeError::Vision(String::from_utf8_lossy(&output.stderr).into_owned()))
    }
}

/// Run `tesseract` in TSV mode over `image_path` and parse each
/// recognized word into a [`UiElement`] bounding box.
///
/// # Errors
///
/// Returns [`RuntimeError::Vision`] under the same conditions as
/// [`ocr_text`].
pub async fn detect_elements(image_path: &Path) -> RuntimeResult<Vec<UiElement>> {
    let output = tokio::time::timeout(
        Duration::from_secs(OCR_TIMEOUT_SEC),
        Command::new("tesseract").arg(image_path).arg("stdout").arg("tsv").output(),
    )
    .await
    .map_err(|_| RuntimeError::Vision("ocr timed out".to_string()))?
    .map_err(|err| RuntimeError::Vision(err.to_string()))?;

    if !output.status.success() {
        return Err(RuntimeError::Vision(String::from_utf8_lossy(&output.stderr).into_owned()));
    }

    Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_tsv(tsv: &str) -> Vec<UiElement> {
    let mut elements = Vec::new();
    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }
        let Ok(left) = fields[6].parse::<i32>() else { continue };
        let Ok(top) = fields[7].parse::<i32>() else { continue };
        let Ok(width) = fields[8].parse::<i32>() else { continue };
        let Ok(height) = fields[9].parse::<i32>() else { continue };
        let Ok(confidence) = fields[10].parse::<f32>() else { continue };
        let text = fields[11].trim();
        if text.is_empty() || confidence < 0.0 {
            continue;
        }
        elements.push(UiElement { text: text.to_string(), x: left, y: top, width, height, confidence });
    }
    elements
}

/// Where captured screenshots are written, keyed by a generated filename.
#[must_use]
pub fn screenshot_path(dir: &Path, file_stem: &str) -> PathBuf {
    dir.join(format!("{file_stem}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tsv_rows_into_elements() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
                   5\t1\t1\t1\t1\t1\t10\t20\t30\t15\t92.5\tSubmit\n";
        let elements = parse_tsv(tsv);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "Submit");
        assert_eq!(elements[0].x, 10);
    }

    #[test]
    fn skips_rows_with_empty_text() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
                   5\t1\t1\t1\t1\t1\t10\t20\t30\t15\t-1\t\n";
        assert!(parse_tsv(tsv).is_empty());
    }
}
