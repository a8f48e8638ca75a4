use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker printed by card statements for purchases paid in a single charge.
pub const SINGLE_INSTALLMENT: &str = "Única";

/// "current of total" marker attached to a split card purchase, e.g. `3/12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub current: u32,
    pub total: u32,
}

impl Installment {
    pub fn new(current: u32, total: u32) -> Option<Self> {
        if current == 0 || total == 0 || current > total {
            return None;
        }
        Some(Installment { current, total })
    }

    /// Billing date of this installment: the purchase date advanced by
    /// `current - 1` months. Day-of-month is clamped to the target month's end.
    pub fn project(self, purchase_date: NaiveDate) -> Option<NaiveDate> {
        add_months(purchase_date, self.current - 1)
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

impl FromStr for Installment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (current, total) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("Invalid installment marker: '{s}'"))?;
        let current: u32 = current
            .trim()
            .parse()
            .map_err(|_| format!("Invalid installment marker: '{s}'"))?;
        let total: u32 = total
            .trim()
            .parse()
            .map_err(|_| format!("Invalid installment marker: '{s}'"))?;
        Installment::new(current, total).ok_or_else(|| format!("Invalid installment marker: '{s}'"))
    }
}

/// Whether a raw installment column denotes a single (non-split) charge.
pub fn is_single_installment(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty()
        || raw.eq_ignore_ascii_case("unica")
        || raw.to_lowercase() == SINGLE_INSTALLMENT.to_lowercase()
}

pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
