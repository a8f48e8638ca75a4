use chrono::NaiveDate;
use serde::Serialize;

use super::money::Money;
use super::transaction::{AdditionalInfo, ParsedTransaction, TransactionType};

/// Per-type counts and totals of one import. Totals are sums of absolute amounts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub total_income: Money,
    pub total_expense: Money,
}

impl ImportSummary {
    pub fn from_transactions(transactions: &[ParsedTransaction]) -> Self {
        transactions
            .iter()
            .fold(ImportSummary::default(), |mut acc, tx| {
                acc.total += 1;
                match tx.kind {
                    TransactionType::Income => {
                        acc.income_count += 1;
                        acc.total_income = acc.total_income + tx.amount.abs();
                    }
                    TransactionType::Expense => {
                        acc.expense_count += 1;
                        acc.total_expense = acc.total_expense + tx.amount.abs();
                    }
                }
                acc
            })
    }

    /// Income minus expenses.
    pub fn net(&self) -> Money {
        self.total_income - self.total_expense
    }
}

/// The shape handed to the ledger: one signed amount instead of amount + type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitid: Option<String>,
    #[serde(skip_serializing_if = "AdditionalInfo::is_empty")]
    pub additional_info: AdditionalInfo,
}

impl From<&ParsedTransaction> for NormalizedTransaction {
    fn from(tx: &ParsedTransaction) -> Self {
        NormalizedTransaction {
            date: tx.date,
            description: tx.description.clone(),
            amount: tx.signed_amount(),
            fitid: tx.fitid.clone(),
            additional_info: tx.additional_info.clone(),
        }
    }
}

pub fn normalize(transactions: &[ParsedTransaction]) -> Vec<NormalizedTransaction> {
    transactions.iter().map(NormalizedTransaction::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn tx(cents: i64, kind: TransactionType) -> ParsedTransaction {
        ParsedTransaction::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "t",
            Decimal::new(cents, 2),
            kind,
        )
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = ImportSummary::from_transactions(&[]);
        assert_eq!(s, ImportSummary::default());
        assert!(s.net().is_zero());
    }

    #[test]
    fn counts_and_totals_per_type() {
        let txs = vec![
            tx(150000, TransactionType::Income),
            tx(4990, TransactionType::Expense),
            tx(10010, TransactionType::Expense),
            tx(-2500, TransactionType::Income),
        ];
        let s = ImportSummary::from_transactions(&txs);
        assert_eq!(s.total, 4);
        assert_eq!(s.income_count, 2);
        assert_eq!(s.expense_count, 2);
        assert_eq!(s.total_income, Money::from_cents(152500));
        assert_eq!(s.total_expense, Money::from_cents(15000));
        assert_eq!(s.net(), Money::from_cents(137500));
    }

    #[test]
    fn normalized_amount_is_negative_iff_expense() {
        let txs = vec![
            tx(100, TransactionType::Income),
            tx(200, TransactionType::Expense),
            tx(0, TransactionType::Expense),
        ];
        for (orig, norm) in txs.iter().zip(normalize(&txs)) {
            match orig.kind {
                TransactionType::Expense => assert!(norm.amount.is_negative() || norm.amount.is_zero()),
                TransactionType::Income => assert!(!norm.amount.is_negative()),
            }
        }
        assert_eq!(normalize(&txs)[1].amount, Money::from_cents(-200));
    }
}
