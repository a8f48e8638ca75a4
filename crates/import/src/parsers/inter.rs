//! Banco Inter OFX export. Inter writes the readable text into MEMO.

use extrato_core::{BankCode, BankParserInfo, FileFormat, ImportResult};

use super::BankParser;
use crate::ofx::{self, DescriptionStyle};
use crate::util::{contains_any, has_extension};

const ISSUER_MARKERS: &[&str] = &["banco inter", "bancointer", "inter&co", "inter &amp; co"];
const BANK_IDS: &[&str] = &["077", "0077", "77"];

pub struct InterOfxParser;

impl BankParser for InterOfxParser {
    fn info(&self) -> BankParserInfo {
        BankParserInfo {
            bank_code: BankCode::InterOfx,
            bank_name: "Banco Inter",
            supported_formats: &[FileFormat::Ofx],
            description: "Extrato do Banco Inter exportado em OFX",
        }
    }

    fn supports(&self, filename: &str, content: &str) -> bool {
        if !has_extension(filename, "ofx") {
            return false;
        }
        let lower = content.to_lowercase();
        if !ofx::looks_like_ofx(&lower) {
            return false;
        }
        contains_any(&lower, ISSUER_MARKERS)
            || ofx::tag_value(content, &content.to_ascii_lowercase(), "BANKID")
                .is_some_and(|id| BANK_IDS.contains(&id.as_str()))
    }

    fn parse(&self, content: &str) -> ImportResult {
        ofx::parse_statement(content, BankCode::InterOfx, DescriptionStyle::MemoFirst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::TransactionType;

    const SAMPLE: &str = "OFXHEADER:100\nDATA:OFXSGML\n\n<OFX>\n<SIGNONMSGSRSV1><SONRS><FI><ORG>Banco Inter S.A.</ORG><FID>077</FID></FI></SONRS></SIGNONMSGSRSV1>\n\
<BANKMSGSRSV1><STMTTRNRS><STMTRS><CURDEF>BRL\n<BANKACCTFROM><BANKID>077<ACCTID>1234567</BANKACCTFROM>\n<BANKTRANLIST>\n\
<STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20240105<TRNAMT>-35.00<FITID>202401050001<NAME>PIX<MEMO>Pix enviado: FULANO</STMTTRN>\n\
<STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20240106<TRNAMT>100.00<FITID>202401060001<NAME>PIX</STMTTRN>\n\
</BANKTRANLIST></STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>\n";

    #[test]
    fn supports_by_issuer_name_or_bank_id() {
        assert!(InterOfxParser.supports("inter.ofx", SAMPLE));
        assert!(InterOfxParser.supports("x.ofx", "<OFX><BANKID>077</BANKID><STMTTRN></STMTTRN></OFX>"));
        assert!(!InterOfxParser.supports("inter.csv", SAMPLE));
        assert!(!InterOfxParser.supports("x.ofx", "<OFX><BANKID>001<NAME>INTERNET BANKING</OFX>"));
    }

    #[test]
    fn memo_is_the_description() {
        let r = InterOfxParser.parse(SAMPLE);
        assert!(r.success);
        assert_eq!(r.transactions.len(), 2);
        assert_eq!(r.transactions[0].description, "Pix enviado: FULANO");
        assert_eq!(r.transactions[0].kind, TransactionType::Expense);
        assert_eq!(r.transactions[0].fitid.as_deref(), Some("202401050001"));
        assert_eq!(r.transactions[1].description, "PIX");
        assert_eq!(r.transactions[1].kind, TransactionType::Income);
        assert_eq!(r.transactions[1].additional_info["org"], "Banco Inter S.A.");
    }
}
