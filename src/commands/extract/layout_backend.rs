use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::cli::{ExtractArgs, LayoutSource};
use crate::engine::{LayoutDocument, LayoutPage, PositionedWord};
use crate::util::read_json_file;

pub(super) fn load_layout(args: &ExtractArgs) -> Result<LayoutDocument> {
    let document = match args.layout_source {
        LayoutSource::Json => {
            let Some(layout_path) = args.layout_path.as_deref() else {
                bail!("--layout-path is required with --layout-source json");
            };
            load_layout_json(layout_path)?
        }
        LayoutSource::Pdftotext => extract_layout_with_pdftotext(&args.pdf_path)?,
    };

    if document.page_count() == 0 {
        bail!(
            "layout source '{}' produced no pages for {}",
            args.layout_source.as_str(),
            args.pdf_path.display()
        );
    }

    info!(
        source = args.layout_source.as_str(),
        pages = document.page_count(),
        tables = document.table_count(),
        "loaded page layout"
    );
    Ok(document)
}

fn load_layout_json(path: &Path) -> Result<LayoutDocument> {
    let document: LayoutDocument = read_json_file(path)?;
    for (index, page) in document.pages.iter().enumerate() {
        if let Some(table) = page
            .tables
            .iter()
            .find(|table| table.bbox[1] > table.bbox[3])
        {
            bail!(
                "table on page {} of {} has an inverted bbox {:?}",
                index + 1,
                path.display(),
                table.bbox
            );
        }
    }
    Ok(document)
}

fn extract_layout_with_pdftotext(pdf_path: &Path) -> Result<LayoutDocument> {
    let output = Command::new("pdftotext")
        .arg("-bbox")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    parse_bbox_html(&String::from_utf8_lossy(&output.stdout))
}

pub(super) fn parse_bbox_html(html: &str) -> Result<LayoutDocument> {
    let page_regex = Regex::new(r#"(?s)<page\s+width="([-\d.]+)"\s+height="([-\d.]+)">(.*?)</page>"#)
        .context("failed to compile bbox page regex")?;
    let word_regex = Regex::new(
        r#"(?s)<word\s+xMin="([-\d.]+)"\s+yMin="([-\d.]+)"\s+xMax="([-\d.]+)"\s+yMax="([-\d.]+)">(.*?)</word>"#,
    )
    .context("failed to compile bbox word regex")?;

    let mut pages = Vec::new();
    for page_captures in page_regex.captures_iter(html) {
        let width = capture_f64(&page_captures, 1);
        let height = capture_f64(&page_captures, 2);
        let body = page_captures.get(3).map(|value| value.as_str()).unwrap_or("");

        let words = word_regex
            .captures_iter(body)
            .filter_map(|captures| {
                let text = unescape_entities(captures.get(5)?.as_str());
                if text.is_empty() {
                    return None;
                }
                Some(PositionedWord {
                    text,
                    x_start: capture_f64(&captures, 1)?,
                    y_top: capture_f64(&captures, 2)?,
                    x_end: capture_f64(&captures, 3)?,
                    y_bottom: capture_f64(&captures, 4)?,
                })
            })
            .collect::<Vec<PositionedWord>>();

        pages.push(LayoutPage {
            width,
            height,
            words,
            tables: Vec::new(),
        });
    }

    Ok(LayoutDocument { pages })
}

fn capture_f64(captures: &regex::Captures<'_>, index: usize) -> Option<f64> {
    captures
        .get(index)
        .and_then(|value| value.as_str().parse::<f64>().ok())
}

fn unescape_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
