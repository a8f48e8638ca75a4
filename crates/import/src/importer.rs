//! Import engine: bank selection, detection, fault isolation and summary.

use std::panic::{self, AssertUnwindSafe};

use extrato_core::{
    normalize, BankCode, BankParserInfo, BankSelection, ImportResult, ImportSummary,
    NormalizedTransaction,
};
use serde::Serialize;

use crate::detect::detect;
use crate::parsers::{panic_message, BankParser, ImportError};
use crate::registry::ParserRegistry;
use crate::sink::{ImportSink, NullSink};

/// `bankDetected` value when no dialect could be chosen.
pub const UNKNOWN_BANK: &str = "unknown";

/// One import's outcome as handed to the ledger collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub bank_detected: String,
    pub bank_name: String,
    pub result: ImportResult,
    pub summary: ImportSummary,
}

impl ImportReport {
    fn new(info: &BankParserInfo, result: ImportResult) -> Self {
        ImportReport {
            bank_detected: info.bank_code.as_str().to_string(),
            bank_name: info.bank_name.to_string(),
            summary: ImportSummary::from_transactions(&result.transactions),
            result,
        }
    }

    fn undetected(filename: &str) -> Self {
        ImportReport {
            bank_detected: UNKNOWN_BANK.to_string(),
            bank_name: UNKNOWN_BANK.to_string(),
            result: ImportError::Undetected(filename.to_string()).into(),
            summary: ImportSummary::default(),
        }
    }

    /// Signed-amount view of the transactions.
    pub fn normalized(&self) -> Vec<NormalizedTransaction> {
        normalize(&self.result.transactions)
    }

    /// The dialect that produced this report, if one was chosen.
    pub fn bank_code(&self) -> Option<BankCode> {
        self.bank_detected.parse().ok()
    }
}

pub struct StatementImporter<S: ImportSink = NullSink> {
    registry: &'static ParserRegistry,
    sink: S,
}

impl StatementImporter<NullSink> {
    pub fn new() -> Self {
        Self::with_sink(NullSink)
    }
}

impl Default for StatementImporter<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ImportSink> StatementImporter<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            registry: ParserRegistry::global(),
            sink,
        }
    }

    /// Parses `content` with the selected dialect, or with the first one
    /// that recognises the file when `selection` is `Auto`.
    pub fn import(&self, filename: &str, content: &str, selection: BankSelection) -> ImportReport {
        let parser = match selection {
            BankSelection::Bank(code) => self.registry.get(code),
            BankSelection::Auto => {
                let found = detect(self.registry, filename, content);
                if let Some(p) = found {
                    self.sink.on_detected(filename, p.info().bank_code);
                }
                found
            }
        };

        let Some(parser) = parser else {
            self.sink.on_undetected(filename);
            return ImportReport::undetected(filename);
        };

        let info = parser.info();
        let result = run_isolated(parser, content);
        self.sink.on_completed(filename, info.bank_code, &result);
        ImportReport::new(&info, result)
    }

    pub fn available_banks(&self) -> Vec<BankParserInfo> {
        self.registry.available_banks()
    }
}

/// A fault escaping a parser ends this document only.
fn run_isolated(parser: &dyn BankParser, content: &str) -> ImportResult {
    panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)))
        .unwrap_or_else(|payload| ImportError::Internal(panic_message(payload.as_ref())).into())
}
