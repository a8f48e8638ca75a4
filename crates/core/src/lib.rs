pub mod bank;
pub mod installment;
pub mod money;
pub mod summary;
pub mod transaction;

pub use bank::{BankCode, BankParserInfo, BankSelection, FileFormat, UnknownBankCode};
pub use installment::{add_months, is_single_installment, Installment};
pub use money::Money;
pub use summary::{normalize, ImportSummary, NormalizedTransaction};
pub use transaction::{
    AdditionalInfo, ImportResult, ParseWarning, ParsedTransaction, TransactionType,
    DEFAULT_DESCRIPTION,
};
