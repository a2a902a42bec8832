use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use super::layout_backend::load_layout;
use super::ocr_text::{OcrTextRequest, load_or_generate_ocr_text};
use super::store::{DB_SCHEMA_VERSION, ManualRecord, open_store, replace_manual};
use super::tools::collect_tool_versions;
use crate::cli::{ExtractArgs, LayoutSource, ManualFormat};
use crate::engine::{
    LayoutThresholds, ManualPatterns, extract_current_format, extract_old_format,
};
use crate::model::{
    DictionaryExport, ExtractCounts, ExtractPaths, ExtractRunManifest, SourceEntry,
};
use crate::util::{
    ensure_directory, now_utc_string, read_json_file, safe_file_stem, sha256_file,
    utc_compact_string, write_json_pretty,
};

const MANIFEST_VERSION: u32 = 1;
pub(crate) const LATEST_MANIFEST_FILE: &str = "latest_extract.json";
pub(crate) const DEFAULT_DB_FILE: &str = "data_dictionary.sqlite";

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    if !args.pdf_path.is_file() {
        bail!("manual PDF not found: {}", args.pdf_path.display());
    }

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let manual_id = safe_file_stem(&args.pdf_path);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| cache_root.join(DEFAULT_DB_FILE));
    let export_path = args.export_path.clone().unwrap_or_else(|| {
        cache_root
            .join("exports")
            .join(format!("data_dictionary_{manual_id}.json"))
    });
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "extract_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(
        run_id = %run_id,
        manual_id = %manual_id,
        format = args.format.as_str(),
        "starting extraction"
    );

    let thresholds = load_thresholds(args.thresholds_path.as_deref())?;
    let patterns = ManualPatterns::new()?;
    let mut warnings = Vec::<String>::new();

    let document = load_layout(&args)?;
    if args.format == ManualFormat::Current && document.table_count() == 0 {
        let message = match args.layout_source {
            LayoutSource::Pdftotext => {
                "pdftotext layout carries no tables; no coded values will be bound".to_string()
            }
            LayoutSource::Json => "layout JSON lists no detected tables".to_string(),
        };
        warn!(manual_id = %manual_id, "{message}");
        warnings.push(message);
    }

    let (manual, ocr_text_path) = match args.format {
        ManualFormat::Current => {
            let cache_path = cache_root.join("ocr").join(format!("{manual_id}.txt"));
            let (ocr_text, ocr_text_path) = load_or_generate_ocr_text(&OcrTextRequest {
                pdf_path: &args.pdf_path,
                page_count: document.page_count(),
                supplied_path: args.ocr_text_path.as_deref(),
                cache_path: &cache_path,
                regenerate: args.regen_ocr,
                lang: &args.ocr_lang,
            })?;
            let manual = extract_current_format(&document, &ocr_text, &patterns, &thresholds);
            (manual, Some(ocr_text_path))
        }
        ManualFormat::Old => (extract_old_format(&document, &patterns, &thresholds), None),
    };

    if manual.stats.descriptions_exhausted > 0 {
        warnings.push(format!(
            "{} variables ran out of OCR descriptions",
            manual.stats.descriptions_exhausted
        ));
    }
    if manual.total_observations.is_none() {
        warnings.push("total observation count not found on the first page".to_string());
    }
    if manual.variables.is_empty() {
        warn!(manual_id = %manual_id, "no variables extracted");
        warnings.push("no variables extracted".to_string());
    }

    let sha256 = sha256_file(&args.pdf_path)?;
    let filename = args
        .pdf_path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .to_string();

    let mut connection = open_store(&db_path)?;
    let coded_value_count = replace_manual(
        &mut connection,
        &ManualRecord {
            manual_id: manual_id.clone(),
            filename: filename.clone(),
            sha256: sha256.clone(),
            format: args.format.as_str().to_string(),
            page_count: document.page_count(),
            total_observations: manual.total_observations,
            extracted_at: started_at.clone(),
        },
        &manual.variables,
    )?;
    info!(
        path = %db_path.display(),
        variables = manual.variables.len(),
        coded_values = coded_value_count,
        "dictionary stored"
    );

    let export = DictionaryExport {
        manual_id: manual_id.clone(),
        generated_at: now_utc_string(),
        total_observations: manual.total_observations,
        rows: manual
            .variables
            .iter()
            .map(|variable| variable.dictionary_row())
            .collect(),
        variables: manual.variables.clone(),
    };
    write_json_pretty(&export_path, &export)?;

    let manifest = ExtractRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id: run_id.clone(),
        manual_id: manual_id.clone(),
        format: args.format.as_str().to_string(),
        layout_source: args.layout_source.as_str().to_string(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(&args),
        total_observations: manual.total_observations,
        column_offset: manual.stats.column_offset,
        tool_versions: collect_tool_versions(),
        paths: ExtractPaths {
            cache_root: cache_root.display().to_string(),
            db_path: db_path.display().to_string(),
            export_path: export_path.display().to_string(),
            ocr_text_path: ocr_text_path.map(|path| path.display().to_string()),
            layout_path: args
                .layout_path
                .as_ref()
                .map(|path| path.display().to_string()),
        },
        counts: ExtractCounts::from_stats(&manual.stats, manual.variables.len()),
        source: SourceEntry { filename, sha256 },
        warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;
    write_json_pretty(&manifest_dir.join(LATEST_MANIFEST_FILE), &manifest)?;

    info!(
        run_id = %run_id,
        manifest = %manifest_path.display(),
        export = %export_path.display(),
        variables = manifest.counts.variable_count,
        review_needed = manifest.counts.review_needed_count,
        warnings = manifest.warnings.len(),
        "extraction completed"
    );

    Ok(())
}

pub(super) fn load_thresholds(path: Option<&Path>) -> Result<LayoutThresholds> {
    let Some(path) = path else {
        return Ok(LayoutThresholds::default());
    };
    let thresholds: LayoutThresholds = read_json_file(path)
        .with_context(|| format!("failed to load layout thresholds from {}", path.display()))?;
    if thresholds.offset_step <= 0.0 {
        bail!(
            "offset_step must be positive in {} (got {})",
            path.display(),
            thresholds.offset_step
        );
    }
    Ok(thresholds)
}

pub(super) fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "cmanual".to_string(),
        "extract".to_string(),
        "--pdf-path".to_string(),
        args.pdf_path.display().to_string(),
        "--format".to_string(),
        args.format.as_str().to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--layout-source".to_string(),
        args.layout_source.as_str().to_string(),
    ];

    let optional_paths: [(&str, &Option<PathBuf>); 6] = [
        ("--layout-path", &args.layout_path),
        ("--ocr-text-path", &args.ocr_text_path),
        ("--thresholds-path", &args.thresholds_path),
        ("--db-path", &args.db_path),
        ("--export-path", &args.export_path),
        ("--manifest-path", &args.manifest_path),
    ];
    for (flag, path) in optional_paths {
        if let Some(path) = path {
            command.push(flag.to_string());
            command.push(path.display().to_string());
        }
    }

    if args.format == ManualFormat::Current {
        command.push("--ocr-lang".to_string());
        command.push(args.ocr_lang.clone());
        if args.regen_ocr {
            command.push("--regen-ocr".to_string());
        }
    }

    command.join(" ")
}
