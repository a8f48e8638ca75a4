//! Banco do Brasil OFX export (SGML 1.x, usually Windows-1252).
//!
//! NAME holds the movement kind ("Pix - Enviado"), MEMO the counterparty
//! detail. Balance lines ("Saldo Anterior", "S A L D O") come as records
//! dated in year 0002 and are dropped by the shared OFX interpretation.

use extrato_core::{BankCode, BankParserInfo, FileFormat, ImportResult};

use super::BankParser;
use crate::ofx::{self, DescriptionStyle};
use crate::util::{contains_any, fold, has_extension};

const ISSUER_MARKERS: &[&str] = &["banco do brasil", "bco do brasil"];
const BANK_IDS: &[&str] = &["001", "0001", "1"];

pub struct BancoDoBrasilOfxParser;

impl BankParser for BancoDoBrasilOfxParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::BbOfx,
            bank_name: "Banco do Brasil",
            supported_formats: &[FileFormat::Ofx],
            description: "Extrato do Banco do Brasil exportado em OFX",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        if !has_extension(filename, "ofx") {
            return false;
        }
        let folded = fold(content);
        if !ofx::looks_like_ofx(&folded) {
            return false;
        }
        contains_any(&folded, ISSUER_MARKERS)
            || ofx::tag_value(content, &content.to_ascii_lowercase(), "BANKID")
                .is_some_and(|id| BANK_IDS.contains(&id.as_str()))
    }

    fn parse(&self, content: &str) -> ImportResult {
        ofx::parse_statement(content, BankCode::BbOfx, DescriptionStyle::NameAndMemo)
    }
}
