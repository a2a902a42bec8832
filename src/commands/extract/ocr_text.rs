use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use super::tools::command_available;
use crate::util::{ensure_directory, safe_file_stem};

pub(super) const PAGE_BREAK_MARKER: &str = "!!!PAGEBREAK!!!";

#[derive(Debug)]
pub(super) struct OcrTextRequest<'a> {
    pub pdf_path: &'a Path,
    pub page_count: usize,
    pub supplied_path: Option<&'a Path>,
    pub cache_path: &'a Path,
    pub regenerate: bool,
    pub lang: &'a str,
}

pub(super) fn load_or_generate_ocr_text(request: &OcrTextRequest<'_>) -> Result<(String, PathBuf)> {
    if let Some(path) = request.supplied_path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read OCR text {}", path.display()))?;
        return Ok((text, path.to_path_buf()));
    }

    if request.cache_path.exists() && !request.regenerate {
        info!(path = %request.cache_path.display(), "reusing cached OCR text");
        let text = fs::read_to_string(request.cache_path).with_context(|| {
            format!("failed to read cached OCR text {}", request.cache_path.display())
        })?;
        return Ok((text, request.cache_path.to_path_buf()));
    }

    if !command_available("pdftoppm") || !command_available("tesseract") {
        bail!(
            "OCR text for {} needs pdftoppm and tesseract, or pass --ocr-text-path",
            request.pdf_path.display()
        );
    }

    let mut text = String::new();
    for page_number in 1..=request.page_count {
        info!(page = page_number, pages = request.page_count, "running OCR");
        let page_text = extract_page_with_ocr(request.pdf_path, page_number, request.lang)
            .with_context(|| {
                format!(
                    "failed OCR extraction for {} page {}",
                    request.pdf_path.display(),
                    page_number
                )
            })?;
        text.push_str(&page_text);
        text.push('\n');
        text.push_str(PAGE_BREAK_MARKER);
        text.push('\n');
    }

    if let Some(parent) = request.cache_path.parent() {
        ensure_directory(parent)?;
    }
    fs::write(request.cache_path, &text)
        .with_context(|| format!("failed to write {}", request.cache_path.display()))?;

    Ok((text, request.cache_path.to_path_buf()))
}

fn extract_page_with_ocr(pdf_path: &Path, page_number: usize, ocr_lang: &str) -> Result<String> {
    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let output_root = std::env::temp_dir().join(format!(
        "cmanual_ocr_{}_{}_{}_{}",
        safe_file_stem(pdf_path),
        std::process::id(),
        page_number,
        stamp
    ));
    let png_path = PathBuf::from(format!("{}.png", output_root.display()));

    let pdftoppm_output = Command::new("pdftoppm")
        .arg("-f")
        .arg(page_number.to_string())
        .arg("-l")
        .arg(page_number.to_string())
        .arg("-r")
        .arg("300")
        .arg("-gray")
        .arg("-singlefile")
        .arg("-png")
        .arg(pdf_path)
        .arg(&output_root)
        .output()
        .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

    if !pdftoppm_output.status.success() {
        let stderr = String::from_utf8_lossy(&pdftoppm_output.stderr);
        bail!(
            "pdftoppm returned non-zero exit status for {} page {}: {}",
            pdf_path.display(),
            page_number,
            stderr.trim()
        );
    }

    if !png_path.exists() {
        bail!(
            "pdftoppm did not produce expected image for {} page {}",
            pdf_path.display(),
            page_number
        );
    }

    let tesseract_output = Command::new("tesseract")
        .arg(&png_path)
        .arg("stdout")
        .arg("-l")
        .arg(ocr_lang)
        .output()
        .with_context(|| format!("failed to execute tesseract for {}", png_path.display()))?;

    let _ = fs::remove_file(&png_path);

    if !tesseract_output.status.success() {
        let stderr = String::from_utf8_lossy(&tesseract_output.stderr);
        bail!(
            "tesseract returned non-zero exit status for {} page {}: {}",
            pdf_path.display(),
            page_number,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&tesseract_output.stdout).replace('\u{0000}', ""))
}
