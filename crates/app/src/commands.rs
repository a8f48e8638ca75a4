use anyhow::{Context, Result};
use extrato_core::{BankSelection, NormalizedTransaction};
use extrato_import::import::available_banks;
use extrato_import::{decode_content, ImportReport, StatementImporter, TracingSink};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub selection: BankSelection,
    pub pretty: bool,
    pub normalized: bool,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    #[serde(flatten)]
    report: &'a ImportReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<Vec<NormalizedTransaction>>,
}

pub fn list_banks(pretty: bool) -> Result<String> {
    to_json(&available_banks(), pretty)
}

/// Reads and parses one statement file. The report is returned even when
/// parsing failed; only I/O problems are errors here.
pub fn import_file(path: &Path, selection: BankSelection) -> Result<ImportReport> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    tracing::info!("Importing statement: {}", path.display());
    let content = decode_content(&data);
    Ok(StatementImporter::with_sink(TracingSink).import(filename, &content, selection))
}

pub fn render_report(report: &ImportReport, opts: &ImportOptions) -> Result<String> {
    let output = ImportOutput {
        report,
        normalized: opts.normalized.then(|| report.normalized()),
    };
    to_json(&output, opts.pretty)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("serialize output")
}
