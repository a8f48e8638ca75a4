//! C6 Bank credit-card invoice (CSV, `;`-separated, columns by header name).
//!
//! ```text
//! Data de Compra;Nome no Cartão;Final do Cartão;Categoria;Descrição;Parcela;Valor (em US$);Cotação (em R$);Valor (em R$)
//! 10/01/2024;FULANO;1234;Eletrônicos;LOJA X;3/12;0;0;99,90
//! ```
//!
//! Purchases are positive, payments and refunds negative. Split purchases are
//! re-dated to the month the installment is billed.

use extrato_core::{
    is_single_installment, BankCode, BankParserInfo, FileFormat, ImportResult, Installment,
    ParsedTransaction, TransactionType,
};

use super::{is_balance_snapshot, strip_bom, BankParser, ImportError, RecordError, ResultBuilder};
use crate::delimited::{
    data_lines, detect_delimiter, field, find_header, split_record, HeaderIndex,
};
use crate::util::{fold, has_extension, parse_amount, parse_br_date};

const HEADER_MARKER: &str = "data de compra";

/// Resolved column positions for one file.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    description: usize,
    amount_brl: usize,
    holder: Option<usize>,
    card_final: Option<usize>,
    category: Option<usize>,
    installment: Option<usize>,
    amount_usd: Option<usize>,
    exchange_rate: Option<usize>,
}

impl Columns {
    fn resolve(header: &HeaderIndex) -> Result<Self, ImportError> {
        Ok(Columns {
            date: header
                .find(&[HEADER_MARKER])
                .ok_or(ImportError::MissingColumn("Data de Compra"))?,
            description: header
                .find(&["descricao"])
                .ok_or(ImportError::MissingColumn("Descrição"))?,
            amount_brl: header
                .find(&["valor (em r$)", "valor em r$", "valor"])
                .ok_or(ImportError::MissingColumn("Valor (em R$)"))?,
            holder: header.find(&["nome no cartao"]),
            card_final: header.find(&["final do cartao"]),
            category: header.find(&["categoria"]),
            installment: header.find(&["parcela"]),
            amount_usd: header.find(&["valor (em us$)", "us$"]),
            exchange_rate: header.find(&["cotacao"]),
        })
    }
}

pub struct C6CardCsvParser;

impl BankParser for C6CardCsvParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::C6Csv,
            bank_name: "C6 Bank - Cartão de Crédito",
            supported_formats: &[FileFormat::Csv],
            description: "Fatura do cartão de crédito C6 Bank exportada em CSV",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        if !has_extension(filename, "csv") {
            return false;
        }
        let folded = fold(content);
        folded.contains(HEADER_MARKER)
            && (folded.contains("parcela") || folded.contains("valor (em r$)"))
    }

    fn parse(&self, content: &str) -> ImportResult {
        let content = strip_bom(content);
        if content.trim().is_empty() {
            return ImportError::Empty.into();
        }

        let lines: Vec<&str> = content.lines().collect();
        let Some(header_idx) = find_header(&lines, |l| l.contains(HEADER_MARKER)) else {
            return ImportError::HeaderNotFound("Data de Compra").into();
        };
        let delimiter = detect_delimiter(lines[header_idx]);
        let header = match split_record(lines[header_idx], delimiter) {
            Ok(fields) => HeaderIndex::new(&fields),
            Err(e) => return ImportError::Internal(e.to_string()).into(),
        };
        let columns = match Columns::resolve(&header) {
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
    let optional = |idx: Option<usize>| idx.map(|i| field(&fields, i)).unwrap_or("");

    let description = field(&fields, cols.description);
    if is_balance_snapshot(&[description]) {
        return Ok(None);
    }

    let raw_date = field(&fields, cols.date);
    let purchase_date =
        parse_br_date(raw_date).ok_or_else(|| RecordError::InvalidDate(raw_date.to_string()))?;

    let raw_amount = field(&fields, cols.amount_brl);
    if raw_amount.trim().is_empty() {
        return Err(RecordError::MissingField("Valor (em R$)"));
    }
    let amount =
        parse_amount(raw_amount).ok_or_else(|| RecordError::InvalidAmount(raw_amount.to_string()))?;
    let kind = if amount.is_sign_negative() && !amount.is_zero() {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };

    let raw_installment = optional(cols.installment).trim();
    let mut date = purchase_date;
    let mut installment = None;
    if !is_single_installment(raw_installment) {
        if let Ok(parsed) = raw_installment.parse::<Installment>() {
            date = parsed
                .project(purchase_date)
                .ok_or_else(|| RecordError::InvalidDate(raw_date.to_string()))?;
            installment = Some(parsed);
        }
    }

    let mut tx = ParsedTransaction::new(date, description, amount, kind)
        .with_info("rawAmount", raw_amount);

    if !raw_installment.is_empty() {
        tx = tx.with_info("installment", raw_installment);
    }
    if let Some(parsed) = installment {
        tx = tx
            .with_info("installmentCurrent", parsed.current)
            .with_info("installmentTotal", parsed.total)
            .with_info("originalPurchaseDate", purchase_date.to_string());
    }

    let category = optional(cols.category).trim();
    if !category.is_empty() && category != "-" {
        tx = tx.with_info("category", category);
    }
    let holder = optional(cols.holder).trim();
    if !holder.is_empty() {
        tx = tx.with_info("cardHolder", holder);
    }
    let card_final = optional(cols.card_final).trim();
    if !card_final.is_empty() {
        tx = tx.with_info("cardLastDigits", card_final);
    }

    let raw_usd = optional(cols.amount_usd).trim();
    if parse_amount(raw_usd).is_some_and(|v| !v.is_zero()) {
        tx = tx.with_info("amountUsd", raw_usd);
        let rate = optional(cols.exchange_rate).trim();
        if !rate.is_empty() {
            tx = tx.with_info("exchangeRate", rate);
        }
    }

    Ok(Some(tx))
}
