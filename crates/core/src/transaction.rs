use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::money::Money;

/// Used when the source row carries no usable description.
pub const DEFAULT_DESCRIPTION: &str = "Sem descrição";

/// Dialect-specific provenance fields. Ordered so serialized output is stable.
pub type AdditionalInfo = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Sign convention for everything consumed outside the parsers:
    /// expenses are negative, income is positive.
    pub fn apply_sign(self, amount: Money) -> Money {
        match self {
            TransactionType::Income => amount.abs(),
            TransactionType::Expense => -amount.abs(),
        }
    }

    /// Fallback classification when a source gives nothing but a signed number.
    pub fn from_sign(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Always non-negative; the sign lives in `kind`.
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitid: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: AdditionalInfo,
}

impl ParsedTransaction {
    pub fn new(date: NaiveDate, description: &str, amount: Decimal, kind: TransactionType) -> Self {
        let description = description.trim();
        ParsedTransaction {
            date,
            description: if description.is_empty() {
                DEFAULT_DESCRIPTION.to_string()
            } else {
                description.to_string()
            },
            amount: Money::from_decimal(amount).abs(),
            kind,
            fitid: None,
            additional_info: AdditionalInfo::new(),
        }
    }

    pub fn with_fitid(mut self, fitid: Option<String>) -> Self {
        self.fitid = fitid.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.additional_info.insert(key.to_string(), value.into());
        self
    }

    pub fn signed_amount(&self) -> Money {
        self.kind.apply_sign(self.amount)
    }
}

/// A record that was skipped, tagged with its 1-based line or record number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl ParseWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        ParseWarning { line, message: message.into() }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub transactions: Vec<ParsedTransaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

impl ImportResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ImportResult {
            success: false,
            transactions: Vec::new(),
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn amount_is_stored_as_absolute_value() {
        let tx = ParsedTransaction::new(date(2024, 1, 5), "Mercado", dec("-49.90"), TransactionType::Expense);
        assert_eq!(tx.amount, Money::from_cents(4990));
        assert_eq!(tx.signed_amount(), Money::from_cents(-4990));
    }

    #[test]
    fn blank_description_uses_placeholder() {
        let tx = ParsedTransaction::new(date(2024, 1, 5), "   ", dec("1"), TransactionType::Income);
        assert_eq!(tx.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn apply_sign_follows_type_not_input_sign() {
        let m = Money::from_cents(-100);
        assert_eq!(TransactionType::Income.apply_sign(m), Money::from_cents(100));
        assert_eq!(TransactionType::Expense.apply_sign(Money::from_cents(100)), Money::from_cents(-100));
    }

    #[test]
    fn from_sign_treats_zero_as_income() {
        assert_eq!(TransactionType::from_sign(dec("-0.01")), TransactionType::Expense);
        assert_eq!(TransactionType::from_sign(Decimal::ZERO), TransactionType::Income);
        assert_eq!(TransactionType::from_sign(dec("12")), TransactionType::Income);
    }

    #[test]
    fn empty_fitid_is_dropped() {
        let tx = ParsedTransaction::new(date(2024, 1, 5), "x", dec("1"), TransactionType::Income)
            .with_fitid(Some("  ".to_string()));
        assert!(tx.fitid.is_none());
    }

    #[test]
    fn serializes_camel_case_with_iso_date() {
        let tx = ParsedTransaction::new(date(2024, 1, 31), "Pix", dec("10"), TransactionType::Expense)
            .with_fitid(Some("ABC".to_string()))
            .with_info("rawValue", "10,00");
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["date"], "2024-01-31");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["fitid"], "ABC");
        assert_eq!(json["additionalInfo"]["rawValue"], "10,00");
    }

    #[test]
    fn warning_display_mentions_line() {
        assert_eq!(ParseWarning::new(7, "invalid date").to_string(), "Line 7: invalid date");
    }

    #[test]
    fn failure_result_has_single_error() {
        let r = ImportResult::failure("File is empty");
        assert!(!r.success);
        assert!(r.transactions.is_empty());
        assert_eq!(r.errors, vec!["File is empty".to_string()]);
    }
}
