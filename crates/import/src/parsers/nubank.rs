//! Nubank CSV exports. Two layouts, both resolved by header name:
//!
//! - card bill: `date,title,amount` with ISO dates, purchases positive;
//! - checking account: `Data,Valor,Identificador,Descrição` with day-first
//!   dates and signed values.

use std::sync::OnceLock;

use chrono::NaiveDate;
use extrato_core::{
    BankCode, BankParserInfo, FileFormat, ImportResult, ParsedTransaction, TransactionType,
};
use regex::Regex;

use super::{
    is_balance_snapshot, reversal_marker, strip_bom, BankParser, ImportError, RecordError,
    ResultBuilder,
};
use crate::delimited::{
    data_lines, detect_delimiter, field, find_header, split_record, HeaderIndex,
};
use crate::util::{fold, has_extension, parse_amount, parse_br_date, parse_iso_date};

fn installment_pattern() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\bparcela\s+(\d{1,3})\s*/\s*(\d{1,3})\b").expect("invalid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Card,
    Account,
}

impl Layout {
    fn detect(folded_line: &str) -> Option<Self> {
        let cols: Vec<&str> = folded_line
            .split([',', ';'])
            .map(|c| c.trim().trim_matches('"').trim_start_matches('\u{feff}'))
            .collect();
        let has = |name: &str| cols.iter().any(|c| *c == name);

        if has("date") && has("title") && has("amount") {
            Some(Layout::Card)
        } else if has("data") && has("valor") && has("identificador") {
            Some(Layout::Account)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    layout: Layout,
    date: usize,
    description: usize,
    amount: usize,
    identifier: Option<usize>,
}

impl Columns {
    fn resolve(layout: Layout, header: &HeaderIndex) -> Result<Self, ImportError> {
        let (date, description, amount) = match layout {
            Layout::Card => (
                header.find(&["date"]).ok_or(ImportError::MissingColumn("date"))?,
                header.find(&["title"]).ok_or(ImportError::MissingColumn("title"))?,
                header.find(&["amount"]).ok_or(ImportError::MissingColumn("amount"))?,
            ),
            Layout::Account => (
                header.find(&["data"]).ok_or(ImportError::MissingColumn("Data"))?,
                header.find(&["descricao"]).ok_or(ImportError::MissingColumn("Descrição"))?,
                header.find(&["valor"]).ok_or(ImportError::MissingColumn("Valor"))?,
            ),
        };
        Ok(Columns {
            layout,
            date,
            description,
            amount,
            identifier: header.find(&["identificador"]),
        })
    }
}

pub struct NubankCsvParser;

impl BankParser for NubankCsvParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::NubankCsv,
            bank_name: "Nubank",
            supported_formats: &[FileFormat::Csv],
            description: "Fatura do cartão ou extrato da conta Nubank exportados em CSV",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        has_extension(filename, "csv") && content.lines().any(|l| Layout::detect(&fold(l)).is_some())
    }

    fn parse(&self, content: &str) -> ImportResult {
        let content = strip_bom(content);
        if content.trim().is_empty() {
            return ImportError::Empty.into();
        }

        let lines: Vec<&str> = content.lines().collect();
        let Some(header_idx) = find_header(&lines, |l| Layout::detect(l).is_some()) else {
            return ImportError::HeaderNotFound("date,title,amount").into();
        };
        let Some(layout) = Layout::detect(&fold(lines[header_idx])) else {
            return ImportError::HeaderNotFound("date,title,amount").into();
        };

        let delimiter = detect_delimiter(lines[header_idx]);
        let header = match split_record(lines[header_idx], delimiter) {
            Ok(fields) => HeaderIndex::new(&fields),
            Err(e) => return ImportError::Internal(e.to_string()).into(),
        };
        let columns = match Columns::resolve(layout, &header) {
            Ok(columns) => columns,
            Err(e) => return e.into(),
        };

        let mut builder = ResultBuilder::new();
        for (line_no, line) in data_lines(&lines, header_idx) {
            builder.record(line_no, || parse_row(line, delimiter, &columns));
        }
        builder.finish()
    }
}

fn parse_row(
    line: &str,
    delimiter: u8,
    cols: &Columns,
) -> Result<Option<ParsedTransaction>, RecordError> {
    let fields = split_record(line, delimiter).map_err(|e| RecordError::Malformed(e.to_string()))?;

    let description = field(&fields, cols.description);
    if is_balance_snapshot(&[description]) {
        return Ok(None);
    }
    if cols.layout == Layout::Account {
        if let Some(marker) = reversal_marker(&[description]) {
            return Err(RecordError::Filtered(format!(
                "reversed or declined transaction '{marker}'"
            )));
        }
    }

    let raw_date = field(&fields, cols.date);
    let date = parse_date(raw_date, cols.layout)
        .ok_or_else(|| RecordError::InvalidDate(raw_date.to_string()))?;

    let raw_amount = field(&fields, cols.amount);
    if raw_amount.trim().is_empty() {
        return Err(RecordError::MissingField("amount"));
    }
    let amount =
        parse_amount(raw_amount).ok_or_else(|| RecordError::InvalidAmount(raw_amount.to_string()))?;

    let kind = match cols.layout {
        // Card bills list purchases as positive and payments/refunds as negative.
        Layout::Card if amount.is_sign_negative() && !amount.is_zero() => TransactionType::Income,
        Layout::Card => TransactionType::Expense,
        Layout::Account => TransactionType::from_sign(amount),
    };

    let mut tx = ParsedTransaction::new(date, description, amount, kind)
        .with_info("rawAmount", raw_amount)
        .with_info(
            "layout",
            match cols.layout {
                Layout::Card => "card",
                Layout::Account => "account",
            },
        );

    if let Some(idx) = cols.identifier {
        let id = field(&fields, idx).trim();
        if !id.is_empty() {
            tx = tx.with_info("identifier", id);
        }
    }
    if let Some(caps) = installment_pattern().captures(description) {
        tx = tx.with_info("installment", format!("{}/{}", &caps[1], &caps[2]));
    }

    Ok(Some(tx))
}

fn parse_date(raw: &str, layout: Layout) -> Option<NaiveDate> {
    match layout {
        Layout::Card => parse_iso_date(raw).or_else(|| parse_br_date(raw)),
        Layout::Account => parse_br_date(raw).or_else(|| parse_iso_date(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::Money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const CARD: &str = "date,title,amount\n\
2024-01-10,Padaria Real,12.50\n\
2024-01-11,Loja Online - Parcela 2/6,199.90\n\
2024-01-15,Pagamento recebido,-1500.00\n";

    const ACCOUNT: &str = "Data,Valor,Identificador,Descrição\n\
02/01/2024,1500.00,65a1b2c3-0001,Transferência recebida pelo Pix - FULANO\n\
03/01/2024,-89.90,65a1b2c3-0002,Compra no débito - MERCADO\n\
04/01/2024,-20.00,65a1b2c3-0003,Transferência estornada - CICLANO\n";

    #[test]
    fn supports_both_layouts() {
        assert!(NubankCsvParser.supports("nubank.csv", CARD));
        assert!(NubankCsvParser.supports("NU_2024.csv", ACCOUNT));
        assert!(!NubankCsvParser.supports("nubank.ofx", CARD));
        assert!(!NubankCsvParser.supports("x.csv", "Data Lançamento,Título,Entrada(R$)\n"));
    }

    #[test]
    fn card_layout_signs() {
        let r = NubankCsvParser.parse(CARD);
        assert!(r.success);
        assert_eq!(r.transactions.len(), 3);

        assert_eq!(r.transactions[0].date, date(2024, 1, 10));
        assert_eq!(r.transactions[0].kind, TransactionType::Expense);
        assert_eq!(r.transactions[0].amount, Money::from_cents(1250));

        assert_eq!(r.transactions[1].additional_info["installment"], "2/6");
        assert_eq!(r.transactions[1].date, date(2024, 1, 11));

        assert_eq!(r.transactions[2].kind, TransactionType::Income);
        assert_eq!(r.transactions[2].amount, Money::from_cents(150000));
    }

    #[test]
    fn account_layout_signs_and_identifier() {
        let r = NubankCsvParser.parse(ACCOUNT);
        assert!(r.success);
        assert_eq!(r.transactions.len(), 2);

        let income = &r.transactions[0];
        assert_eq!(income.kind, TransactionType::Income);
        assert_eq!(income.additional_info["identifier"], "65a1b2c3-0001");
        assert!(income.fitid.is_none());

        let expense = &r.transactions[1];
        assert_eq!(expense.kind, TransactionType::Expense);
        assert_eq!(expense.amount, Money::from_cents(8990));
    }

    #[test]
    fn account_reversal_is_a_warning() {
        let r = NubankCsvParser.parse(ACCOUNT);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].line, 4);
    }

    #[test]
    fn unknown_header_is_document_error() {
        let r = NubankCsvParser.parse("foo,bar\n1,2\n");
        assert!(!r.success);
        assert!(r.errors[0].contains("Header row not found"));
    }
}
