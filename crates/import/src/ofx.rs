//! Tag scanner for OFX 1.x (SGML, closing tags optional) and 2.x (XML), plus
//! the record interpretation shared by the OFX dialects.

use chrono::Datelike;
use extrato_core::{BankCode, ImportResult, ParsedTransaction, TransactionType};
use std::ops::RangeInclusive;

use crate::parsers::{
    is_balance_snapshot, join_description, strip_bom, ImportError, RecordError, ResultBuilder,
};
use crate::util::{parse_amount, parse_ofx_date};

/// Posting years outside this range come from balance-snapshot rows
/// (e.g. `00021130`), not from real movements.
pub const PLAUSIBLE_YEARS: RangeInclusive<i32> = 1900..=2100;

const INCOME_TYPES: &[&str] = &["CREDIT", "DEP", "INT", "DIV", "DIRECTDEP"];
const EXPENSE_TYPES: &[&str] = &[
    "DEBIT",
    "PAYMENT",
    "CHECK",
    "FEE",
    "SRVCHG",
    "ATM",
    "POS",
    "DIRECTDEBIT",
    "CASH",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfxAccount {
    pub org: Option<String>,
    pub bank_id: Option<String>,
    pub account_id: Option<String>,
    pub currency: Option<String>,
}

/// One `<STMTTRN>` block with its raw field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfxRecord {
    /// 1-based position among the document's records.
    pub index: usize,
    pub trn_type: Option<String>,
    pub date_posted: Option<String>,
    pub amount: Option<String>,
    pub fit_id: Option<String>,
    pub name: Option<String>,
    pub memo: Option<String>,
    pub check_number: Option<String>,
    pub ref_number: Option<String>,
    pub currency_symbol: Option<String>,
    pub currency_rate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfxStatement {
    pub account: OfxAccount,
    pub records: Vec<OfxRecord>,
}

/// Splits the document into records and pulls the known fields out of each.
pub fn scan(content: &str) -> OfxStatement {
    // ASCII lowercasing keeps byte offsets aligned with `content`.
    let lower = content.to_ascii_lowercase();
    let starts: Vec<usize> = lower.match_indices("<stmttrn>").map(|(i, _)| i).collect();

    let header_end = starts.first().copied().unwrap_or(content.len());
    let header = &content[..header_end];
    let header_lower = &lower[..header_end];
    let account = OfxAccount {
        org: tag_value(header, header_lower, "ORG"),
        bank_id: tag_value(header, header_lower, "BANKID"),
        account_id: tag_value(header, header_lower, "ACCTID"),
        currency: tag_value(header, header_lower, "CURDEF"),
    };

    let records = starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let body_start = start + "<stmttrn>".len();
            let end = block_end(&lower, body_start);
            let block = &content[body_start..end];
            let block_lower = &lower[body_start..end];
            let get = |tag: &str| tag_value(block, block_lower, tag);

            OfxRecord {
                index: n + 1,
                trn_type: get("TRNTYPE"),
                date_posted: get("DTPOSTED"),
                amount: get("TRNAMT"),
                fit_id: get("FITID"),
                name: get("NAME"),
                memo: get("MEMO"),
                check_number: get("CHECKNUM"),
                ref_number: get("REFNUM"),
                currency_symbol: get("CURSYM"),
                currency_rate: get("CURRATE"),
            }
        })
        .collect();

    OfxStatement { account, records }
}

/// A record ends at its closing tag, the next record, the end of the list,
/// or the end of input, whichever comes first.
fn block_end(lower: &str, from: usize) -> usize {
    let rest = &lower[from..];
    ["</stmttrn>", "<stmttrn>", "</banktranlist>"]
        .iter()
        .filter_map(|marker| rest.find(marker))
        .min()
        .map(|offset| from + offset)
        .unwrap_or(lower.len())
}

/// Value of `<TAG>` inside `block`. Prefers `<TAG>value</TAG>`; without a
/// closing tag the value runs to the next tag or line break.
pub fn tag_value(block: &str, block_lower: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let start = block_lower.find(&open)? + open.len();
    let rest = &block_lower[start..];

    let closed = rest
        .find(&close)
        .filter(|&end| !rest[..end].contains('<'))
        .map(|end| &block[start..start + end]);

    let value = closed.unwrap_or_else(|| {
        let end = rest
            .find(|c: char| c == '<' || c == '\n' || c == '\r')
            .unwrap_or(rest.len());
        &block[start..start + end]
    });

    let value = decode_entities(value.trim());
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn looks_like_ofx(lower: &str) -> bool {
    lower.contains("<ofx") || lower.contains("<stmttrn>") || lower.contains("ofxheader")
}

/// Income/expense from the type code; the amount's sign decides when the
/// code is missing or not one of the known credit/debit families.
pub fn classify(trn_type: Option<&str>, amount: rust_decimal::Decimal) -> TransactionType {
    let code = trn_type.map(|t| t.trim().to_ascii_uppercase());
    match code.as_deref() {
        Some(c) if INCOME_TYPES.contains(&c) => TransactionType::Income,
        Some(c) if EXPENSE_TYPES.contains(&c) => TransactionType::Expense,
        _ => TransactionType::from_sign(amount),
    }
}

/// How a dialect builds the human description from NAME and MEMO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionStyle {
    /// MEMO, falling back to NAME.
    MemoFirst,
    /// `NAME - MEMO` when both carry different text.
    NameAndMemo,
}

impl DescriptionStyle {
    fn describe(self, record: &OfxRecord) -> String {
        let name = record.name.as_deref().unwrap_or("");
        let memo = record.memo.as_deref().unwrap_or("");
        match self {
            DescriptionStyle::MemoFirst if !memo.trim().is_empty() => memo.to_string(),
            DescriptionStyle::MemoFirst => name.to_string(),
            DescriptionStyle::NameAndMemo => join_description(name, memo),
        }
    }
}

/// Full parse of an OFX document into canonical transactions.
pub fn parse_statement(content: &str, bank: BankCode, style: DescriptionStyle) -> ImportResult {
    let content = strip_bom(content);
    if content.trim().is_empty() {
        return ImportError::Empty.into();
    }
    if !looks_like_ofx(&content.to_ascii_lowercase()) {
        return ImportError::HeaderNotFound("<OFX>").into();
    }

    let statement = scan(content);
    let mut builder = ResultBuilder::new();
    for record in &statement.records {
        builder.record(record.index, || {
            interpret(record, &statement.account, style).map(|tx| {
                tx.map(|tx| tx.with_info("source", bank.as_str()))
            })
        });
    }
    builder.finish()
}

fn interpret(
    record: &OfxRecord,
    account: &OfxAccount,
    style: DescriptionStyle,
) -> Result<Option<ParsedTransaction>, RecordError> {
    let name = record.name.as_deref().unwrap_or("");
    let memo = record.memo.as_deref().unwrap_or("");
    if is_balance_snapshot(&[name, memo]) {
        return Ok(None);
    }

    let raw_date = record
        .date_posted
        .as_deref()
        .ok_or(RecordError::MissingField("DTPOSTED"))?;
    if raw_year(raw_date).is_some_and(|y| !PLAUSIBLE_YEARS.contains(&y)) {
        return Ok(None);
    }
    let date = parse_ofx_date(raw_date).ok_or_else(|| RecordError::InvalidDate(raw_date.to_string()))?;
    if !PLAUSIBLE_YEARS.contains(&date.year()) {
        return Ok(None);
    }

    let raw_amount = record
        .amount
        .as_deref()
        .ok_or(RecordError::MissingField("TRNAMT"))?;
    let amount =
        parse_amount(raw_amount).ok_or_else(|| RecordError::InvalidAmount(raw_amount.to_string()))?;
    let kind = classify(record.trn_type.as_deref(), amount);

    let mut tx = ParsedTransaction::new(date, &style.describe(record), amount, kind)
        .with_fitid(record.fit_id.clone())
        .with_info("rawAmount", raw_amount);

    let optional = [
        ("trnType", &record.trn_type),
        ("name", &record.name),
        ("memo", &record.memo),
        ("checkNumber", &record.check_number),
        ("refNumber", &record.ref_number),
        ("currencySymbol", &record.currency_symbol),
        ("currencyRate", &record.currency_rate),
        ("org", &account.org),
        ("bankId", &account.bank_id),
        ("accountId", &account.account_id),
        ("currency", &account.currency),
    ];
    for (key, value) in optional {
        if let Some(v) = value {
            tx = tx.with_info(key, v.as_str());
        }
    }

    Ok(Some(tx))
}

fn raw_year(raw_date: &str) -> Option<i32> {
    let digits = raw_date.trim().get(..4)?;
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
