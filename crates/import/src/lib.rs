pub mod delimited;
pub mod detect;
pub mod importer;
pub mod ofx;
pub mod parsers;
pub mod registry;
pub mod sink;
pub mod util;

pub use detect::{detect, DETECTION_PRIORITY};
pub use importer::{ImportReport, StatementImporter, UNKNOWN_BANK};
pub use parsers::{BankParser, ImportError, RecordError};
pub use registry::ParserRegistry;
pub use sink::{ImportSink, NullSink, TracingSink};
pub use util::{decode_content, parse_amount, parse_br_date, parse_ofx_date};

pub mod import {
    use crate::*;
    use extrato_core::{BankParserInfo, BankSelection};

    /// Decodes raw upload bytes and runs them through the engine.
    pub fn import_bytes(filename: &str, data: &[u8], selection: BankSelection) -> ImportReport {
        let content = decode_content(data);
        StatementImporter::new().import(filename, &content, selection)
    }

    pub fn available_banks() -> Vec<BankParserInfo> {
        ParserRegistry::global().available_banks()
    }
}
