//! The dialect parsers and the pieces they share: the capability trait, the
//! two error severities and the per-record fault barrier.

pub mod bb;
pub mod c6_account;
pub mod c6_card;
pub mod generic_ofx;
pub mod inter;
pub mod nubank;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use extrato_core::{BankParserInfo, ImportResult, ParseWarning, ParsedTransaction};
use thiserror::Error;

use crate::util::{contains_any, fold};

pub use bb::BancoDoBrasilOfxParser;
pub use c6_account::C6AccountCsvParser;
pub use c6_card::C6CardCsvParser;
pub use generic_ofx::GenericOfxParser;
pub use inter::InterOfxParser;
pub use nubank::NubankCsvParser;

/// Capability set every dialect implements.
///
/// `supports` is a cheap, side-effect-free sniff of filename and content.
/// `parse` never fails: problems end up in the result's `errors`/`warnings`.
pub trait BankParser: Send + Sync {
    fn info(&self) -> BankParserInfo;
    fn supports(&self, filename: &str, content: &str) -> bool;
    fn parse(&self, content: &str) -> ImportResult;
}

/// Record-level failure. Becomes a warning; parsing continues.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("skipped {0}")]
    Filtered(String),
    #[error("unexpected failure: {0}")]
    Internal(String),
}

/// Document-level failure. Ends the parse with `success = false`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File is empty")]
    Empty,
    #[error("Header row not found (expected a line containing '{0}')")]
    HeaderNotFound(&'static str),
    #[error("Required column '{0}' not found in header")]
    MissingColumn(&'static str),
    #[error("No transaction records found in the file")]
    NoRecords,
    #[error("No valid transactions found ({0} records skipped)")]
    NoValidTransactions(usize),
    #[error("Could not identify the bank for '{0}'; select the bank manually")]
    Undetected(String),
    #[error("Unexpected failure while parsing: {0}")]
    Internal(String),
}

impl From<ImportError> for ImportResult {
    fn from(err: ImportError) -> Self {
        ImportResult::failure(err.to_string())
    }
}

/// Title/description fragments naming a balance snapshot rather than a movement.
/// Rows carrying them are dropped silently in every dialect.
pub(crate) const BALANCE_MARKERS: &[&str] = &[
    "saldo anterior",
    "saldo do dia",
    "saldo final",
    "saldo total",
    "s a l d o",
];

/// Reversed or declined movements in checking-account exports.
pub(crate) const REVERSAL_MARKERS: &[&str] = &["estornad", "recusad", "nao efetuad"];

pub(crate) fn is_balance_snapshot(texts: &[&str]) -> bool {
    texts
        .iter()
        .any(|t| contains_any(&fold(t), BALANCE_MARKERS))
}

pub(crate) fn reversal_marker(texts: &[&str]) -> Option<String> {
    texts
        .iter()
        .find(|t| contains_any(&fold(t), REVERSAL_MARKERS))
        .map(|t| t.trim().to_string())
}

/// Joins a short title with its longer detail line, skipping blanks and repeats.
pub(crate) fn join_description(title: &str, detail: &str) -> String {
    let (title, detail) = (title.trim(), detail.trim());
    if detail.is_empty() || fold(title) == fold(detail) {
        title.to_string()
    } else if title.is_empty() {
        detail.to_string()
    } else {
        format!("{title} - {detail}")
    }
}

pub(crate) fn strip_bom(content: &str) -> &str {
    content.trim_start_matches('\u{feff}')
}

/// Accumulates one document's outcome, isolating each record behind its own
/// fault barrier so a single bad row only costs that row.
#[derive(Debug, Default)]
pub(crate) struct ResultBuilder {
    transactions: Vec<ParsedTransaction>,
    warnings: Vec<ParseWarning>,
    seen: usize,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` drops the record silently (balance artifacts).
    pub fn record<F>(&mut self, line: usize, parse_record: F)
    where
        F: FnOnce() -> Result<Option<ParsedTransaction>, RecordError>,
    {
        self.seen += 1;
        let outcome = panic::catch_unwind(AssertUnwindSafe(parse_record))
            .unwrap_or_else(|payload| Err(RecordError::Internal(panic_message(payload.as_ref()))));

        match outcome {
            Ok(Some(tx)) => self.transactions.push(tx),
            Ok(None) => {}
            Err(err) => self.warnings.push(ParseWarning::new(line, err.to_string())),
        }
    }

    pub fn finish(self) -> ImportResult {
        let mut errors = Vec::new();
        if self.transactions.is_empty() {
            let err = if self.seen == 0 {
                ImportError::NoRecords
            } else {
                ImportError::NoValidTransactions(self.warnings.len())
            };
            errors.push(err.to_string());
        }

        ImportResult {
            success: !self.transactions.is_empty(),
            transactions: self.transactions,
            errors,
            warnings: self.warnings,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic while parsing".to_string()
    }
}
