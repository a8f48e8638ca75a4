//! AUTO mode: pick a dialect from filename and content.

use extrato_core::BankCode;

use crate::parsers::BankParser;
use crate::registry::ParserRegistry;

/// Order in which detectors are asked; the first `supports()` hit wins.
///
/// Dialects overlap on surface markers, so this order decides ambiguous
/// files: the C6 checking export before the C6 card export, Inter before
/// Banco do Brasil, and the generic OFX reader last.
pub const DETECTION_PRIORITY: [BankCode; 6] = [
    BankCode::C6ContaCsv,
    BankCode::C6Csv,
    BankCode::NubankCsv,
    BankCode::InterOfx,
    BankCode::BbOfx,
    BankCode::GenericOfx,
];

pub fn detect<'r>(
    registry: &'r ParserRegistry,
    filename: &str,
    content: &str,
) -> Option<&'r dyn BankParser> {
    DETECTION_PRIORITY
        .iter()
        .filter_map(|&code| registry.get(code))
        .find(|parser| parser.supports(filename, content))
}
