use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of statement dialects the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BankCode {
    #[serde(rename = "C6_CSV")]
    C6Csv,
    #[serde(rename = "C6_CONTA_CSV")]
    C6ContaCsv,
    #[serde(rename = "INTER_OFX")]
    InterOfx,
    #[serde(rename = "BB_OFX")]
    BbOfx,
    #[serde(rename = "NUBANK_CSV")]
    NubankCsv,
    #[serde(rename = "GENERIC_OFX")]
    GenericOfx,
}

impl BankCode {
    pub const ALL: [BankCode; 6] = [
        BankCode::C6Csv,
        BankCode::C6ContaCsv,
        BankCode::InterOfx,
        BankCode::BbOfx,
        BankCode::NubankCsv,
        BankCode::GenericOfx,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BankCode::C6Csv => "C6_CSV",
            BankCode::C6ContaCsv => "C6_CONTA_CSV",
            BankCode::InterOfx => "INTER_OFX",
            BankCode::BbOfx => "BB_OFX",
            BankCode::NubankCsv => "NUBANK_CSV",
            BankCode::GenericOfx => "GENERIC_OFX",
        }
    }

    /// The fallback dialect is not offered for manual selection listings.
    pub fn is_generic(self) -> bool {
        matches!(self, BankCode::GenericOfx)
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown bank code: '{0}'")]
pub struct UnknownBankCode(pub String);

impl FromStr for BankCode {
    type Err = UnknownBankCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BankCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownBankCode(wanted.to_string()))
    }
}

/// What the caller asked for: a specific dialect or content-based detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankSelection {
    #[default]
    Auto,
    Bank(BankCode),
}

impl FromStr for BankSelection {
    type Err = UnknownBankCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("AUTO") {
            return Ok(BankSelection::Auto);
        }
        s.parse().map(BankSelection::Bank)
    }
}

impl fmt::Display for BankSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankSelection::Auto => f.write_str("AUTO"),
            BankSelection::Bank(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Ofx,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Ofx => write!(f, "ofx"),
        }
    }
}

/// Static identity of one dialect parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankParserInfo {
    pub bank_code: BankCode,
    pub bank_name: &'static str,
    pub supported_formats: &'static [FileFormat],
    pub description: &'static str,
}
