//! Observer seam for import events. The parsers never log themselves.

use extrato_core::{BankCode, ImportResult, ImportSummary};

/// Receives one import's lifecycle events. Every method defaults to a no-op.
pub trait ImportSink {
    fn on_detected(&self, _filename: &str, _bank: BankCode) {}
    fn on_undetected(&self, _filename: &str) {}
    fn on_completed(&self, _filename: &str, _bank: BankCode, _result: &ImportResult) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ImportSink for NullSink {}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ImportSink for TracingSink {
    fn on_detected(&self, filename: &str, bank: BankCode) {
        tracing::info!("Detected {bank} for: {filename}");
    }

    fn on_undetected(&self, filename: &str) {
        tracing::warn!("No dialect recognised: {filename}");
    }

    fn on_completed(&self, filename: &str, bank: BankCode, result: &ImportResult) {
        let summary = ImportSummary::from_transactions(&result.transactions);
        tracing::info!(
            bank = %bank,
            transactions = summary.total,
            warnings = result.warnings.len(),
            income = %summary.total_income,
            expense = %summary.total_expense,
            net = %summary.net(),
            "Import finished: {filename}"
        );
        for warning in &result.warnings {
            tracing::warn!("{filename}: {warning}");
        }
        for error in &result.errors {
            tracing::error!("{filename}: {error}");
        }
    }
}
