//! The fixed code → parser table.

use std::sync::OnceLock;

use extrato_core::{BankCode, BankParserInfo};

use crate::parsers::{
    BancoDoBrasilOfxParser, BankParser, C6AccountCsvParser, C6CardCsvParser, GenericOfxParser,
    InterOfxParser, NubankCsvParser,
};

/// Every known dialect, one parser per `BankCode`. Immutable once built.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn BankParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        let parsers: Vec<Box<dyn BankParser>> = vec![
            Box::new(C6CardCsvParser),
            Box::new(C6AccountCsvParser),
            Box::new(InterOfxParser),
            Box::new(BancoDoBrasilOfxParser),
            Box::new(NubankCsvParser),
            Box::new(GenericOfxParser),
        ];
        Self { parsers }
    }

    /// Process-wide instance, built on first use.
    pub fn global() -> &'static ParserRegistry {
        static REGISTRY: OnceLock<ParserRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ParserRegistry::new)
    }

    pub fn get(&self, code: BankCode) -> Option<&dyn BankParser> {
        self.parsers
            .iter()
            .find(|p| p.info().bank_code == code)
            .map(|p| p.as_ref())
    }

    /// User-facing capability listing. The generic fallback is left out.
    pub fn available_banks(&self) -> Vec<BankParserInfo> {
        BankCode::ALL
            .into_iter()
            .filter(|code| !code.is_generic())
            .filter_map(|code| self.get(code).map(|p| p.info()))
            .collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
