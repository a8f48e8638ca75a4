//! C6 Bank checking-account statement (CSV).
//!
//! The export opens with a few preamble lines (title, agency, period) before
//! the header. Columns are positional:
//!
//! ```text
//! Data Lançamento,Data Contábil,Título,Descrição,Entrada(R$),Saída(R$),Saldo do Dia(R$)
//! 02/01/2024,02/01/2024,Pix recebido,FULANO DE TAL,"1.500,00",,"1.500,00"
//! ```

use extrato_core::{
    BankCode, BankParserInfo, FileFormat, ImportResult, ParsedTransaction, TransactionType,
};
use rust_decimal::Decimal;

use super::{
    is_balance_snapshot, join_description, reversal_marker, strip_bom, BankParser, ImportError,
    RecordError, ResultBuilder,
};
use crate::delimited::{data_lines, detect_delimiter, field, find_header, split_record};
use crate::util::{fold, has_extension, parse_amount, parse_br_date};

const HEADER_MARKER: &str = "data lancamento";

const COL_DATE: usize = 0;
const COL_ACCOUNTING_DATE: usize = 1;
const COL_TITLE: usize = 2;
const COL_DETAIL: usize = 3;
const COL_INFLOW: usize = 4;
const COL_OUTFLOW: usize = 5;
const COL_DAY_BALANCE: usize = 6;

pub struct C6AccountCsvParser;

impl BankParser for C6AccountCsvParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::C6ContaCsv,
            bank_name: "C6 Bank - Conta Corrente",
            supported_formats: &[FileFormat::Csv],
            description: "Extrato de conta corrente do C6 Bank exportado em CSV",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        if !has_extension(filename, "csv") {
            return false;
        }
        let folded = fold(content);
        folded.contains(HEADER_MARKER) && (folded.contains("entrada") || folded.contains("saida"))
    }

    fn parse(&self, content: &str) -> ImportResult {
        let content = strip_bom(content);
        if content.trim().is_empty() {
            return ImportError::Empty.into();
        }

        let lines: Vec<&str> = content.lines().collect();
        let Some(header_idx) = find_header(&lines, |l| l.contains(HEADER_MARKER)) else {
            return ImportError::HeaderNotFound("Data Lançamento").into();
        };
        let delimiter = detect_delimiter(lines[header_idx]);

        let mut builder = ResultBuilder::new();
        for (line_no, line) in data_lines(&lines, header_idx) {
            builder.record(line_no, || parse_row(line, delimiter));
        }
        builder.finish()
    }
}

fn parse_row(line: &str, delimiter: u8) -> Result<Option<ParsedTransaction>, RecordError> {
    let fields = split_record(line, delimiter).map_err(|e| RecordError::Malformed(e.to_string()))?;
    if fields.len() <= COL_OUTFLOW {
        return Err(RecordError::Malformed(format!(
            "expected at least {} columns, found {}",
            COL_OUTFLOW + 1,
            fields.len()
        )));
    }

    let title = field(&fields, COL_TITLE);
    let detail = field(&fields, COL_DETAIL);
    if is_balance_snapshot(&[title, detail]) {
        return Ok(None);
    }
    if let Some(marker) = reversal_marker(&[title, detail]) {
        return Err(RecordError::Filtered(format!("reversed or declined transaction '{marker}'")));
    }

    let raw_date = field(&fields, COL_DATE);
    let date = parse_br_date(raw_date).ok_or_else(|| RecordError::InvalidDate(raw_date.to_string()))?;

    let raw_inflow = field(&fields, COL_INFLOW);
    let raw_outflow = field(&fields, COL_OUTFLOW);
    let inflow = optional_amount(raw_inflow)?;
    let outflow = optional_amount(raw_outflow)?;

    let (amount, kind, raw_amount) = match (inflow, outflow) {
        (Some(v), _) if !v.is_zero() => (v, TransactionType::Income, raw_inflow),
        (_, Some(v)) if !v.is_zero() => (v, TransactionType::Expense, raw_outflow),
        (Some(v), _) => (v, TransactionType::Income, raw_inflow),
        (_, Some(v)) => (v, TransactionType::Expense, raw_outflow),
        (None, None) => return Err(RecordError::MissingField("Entrada/Saída value")),
    };

    let mut tx = ParsedTransaction::new(date, &join_description(title, detail), amount, kind)
        .with_info("title", title)
        .with_info("rawAmount", raw_amount);
    if !detail.is_empty() {
        tx = tx.with_info("details", detail);
    }

    let raw_accounting = field(&fields, COL_ACCOUNTING_DATE);
    if let Some(accounting) = parse_br_date(raw_accounting) {
        tx = tx.with_info("accountingDate", accounting.to_string());
    }
    let day_balance = field(&fields, COL_DAY_BALANCE);
    if !day_balance.is_empty() {
        tx = tx.with_info("dayBalance", day_balance);
    }

    Ok(Some(tx))
}

fn optional_amount(raw: &str) -> Result<Option<Decimal>, RecordError> {
    if raw.trim().is_empty() || raw.trim() == "-" {
        return Ok(None);
    }
    parse_amount(raw)
        .map(Some)
        .ok_or_else(|| RecordError::InvalidAmount(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use extrato_core::Money;

    const SAMPLE: &str = "EXTRATO DE CONTA CORRENTE C6 BANK\n\
Agência: 1 / Conta: 12345678-9\n\
Período: 01/01/2024 a 31/01/2024\n\
\n\
Data Lançamento,Data Contábil,Título,Descrição,Entrada(R$),Saída(R$),Saldo do Dia(R$)\n\
02/01/2024,02/01/2024,Pix recebido de FULANO,Transferência recebida,\"1.500,00\",,\"1.500,00\"\n\
03/01/2024,03/01/2024,Pagamento de boleto,CONDOMINIO EDIFICIO,,\"450,30\",\"1.049,70\"\n\
03/01/2024,03/01/2024,Saldo do dia,,,,\"1.049,70\"\n\
04/01/2024,04/01/2024,Pix enviado,Transferência estornada,,\"20,00\",\"1.049,70\"\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn supports_requires_csv_and_header() {
        let p = C6AccountCsvParser;
        assert!(p.supports("extrato.csv", SAMPLE));
        assert!(p.supports("EXTRATO.CSV", SAMPLE));
        assert!(!p.supports("extrato.ofx", SAMPLE));
        assert!(!p.supports("extrato.csv", "date,title,amount\n2024-01-01,x,1\n"));
    }

    #[test]
    fn parses_inflows_and_outflows() {
        let r = C6AccountCsvParser.parse(SAMPLE);
        assert!(r.success);
        assert_eq!(r.transactions.len(), 2);

        let income = &r.transactions[0];
        assert_eq!(income.date, date(2024, 1, 2));
        assert_eq!(income.kind, TransactionType::Income);
        assert_eq!(income.amount, Money::from_cents(150000));
        assert_eq!(income.description, "Pix recebido de FULANO - Transferência recebida");
        assert!(income.fitid.is_none());

        let expense = &r.transactions[1];
        assert_eq!(expense.kind, TransactionType::Expense);
        assert_eq!(expense.amount, Money::from_cents(45030));
        assert_eq!(expense.additional_info["dayBalance"], "1.049,70");
        assert_eq!(expense.additional_info["accountingDate"], "2024-01-03");
    }

    #[test]
    fn balance_rows_are_silent_and_reversals_warn() {
        let r = C6AccountCsvParser.parse(SAMPLE);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].line, 9);
        assert!(r.warnings[0].message.contains("estornada"));
    }

    #[test]
    fn semicolon_export_is_accepted() {
        let content = "Data Lançamento;Data Contábil;Título;Descrição;Entrada(R$);Saída(R$);Saldo do Dia(R$)\n\
10/02/2024;10/02/2024;Tarifa;Pacote de serviços;;19,90;100,00\n";
        let r = C6AccountCsvParser.parse(content);
        assert!(r.success);
        assert_eq!(r.transactions[0].amount, Money::from_cents(1990));
        assert_eq!(r.transactions[0].kind, TransactionType::Expense);
    }

    #[test]
    fn row_without_values_is_a_warning() {
        let content = "Data Lançamento,Data Contábil,Título,Descrição,Entrada(R$),Saída(R$),Saldo do Dia(R$)\n\
10/02/2024,10/02/2024,Pix,FULANO,,,\n\
11/02/2024,11/02/2024,Pix,FULANO,\"5,00\",,\n";
        let r = C6AccountCsvParser.parse(content);
        assert_eq!(r.transactions.len(), 1);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].line, 2);
    }

    #[test]
    fn missing_header_is_document_error() {
        let r = C6AccountCsvParser.parse("foo,bar\n1,2\n");
        assert!(!r.success);
        assert_eq!(r.errors.len(), 1);
        assert!(r.errors[0].contains("Header row not found"));
    }

    #[test]
    fn empty_file_is_document_error() {
        let r = C6AccountCsvParser.parse("  \n");
        assert_eq!(r.errors, vec![ImportError::Empty.to_string()]);
    }

    #[test]
    fn header_only_reports_no_records() {
        let r = C6AccountCsvParser
            .parse("Data Lançamento,Data Contábil,Título,Descrição,Entrada(R$),Saída(R$),Saldo do Dia(R$)\n");
        assert!(!r.success);
        assert_eq!(r.errors, vec![ImportError::NoRecords.to_string()]);
    }
}
