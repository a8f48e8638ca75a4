//! Fallback for OFX files from institutions without a dedicated dialect.

use extrato_core::{BankCode, BankParserInfo, FileFormat, ImportResult};

use super::BankParser;
use crate::ofx::{self, DescriptionStyle};
use crate::util::has_extension;

pub struct GenericOfxParser;

impl BankParser for GenericOfxParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::GenericOfx,
            bank_name: "OFX Genérico",
            supported_formats: &[FileFormat::Ofx],
            description: "Qualquer extrato no formato OFX 1.x ou 2.x",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        if !has_extension(filename, "ofx") {
            return false;
        }
        let lower = content.to_ascii_lowercase();
        lower.contains("<ofx") || lower.contains("<stmttrn>")
    }

    fn parse(&self, content: &str) -> ImportResult {
        ofx::parse_statement(content, BankCode::GenericOfx, DescriptionStyle::MemoFirst)
    }
}
