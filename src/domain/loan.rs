//! Lending: offers, active loans, loan books.

use rust_decimal::Decimal;

/// One price level in a public loan book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanBookEntry {
    /// Daily interest rate, as a ratio.
    pub rate: Decimal,
    pub amount: Decimal,
    /// Shortest duration at this level, days.
    pub range_min: u32,
    /// Longest duration at this level, days.
    pub range_max: u32,
}

/// The public loan book for one currency: offers (supply) and demands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanBook {
    pub currency: String,
    pub offers: Vec<LoanBookEntry>,
    pub demands: Vec<LoanBookEntry>,
}

/// An open (unfilled) loan offer owned by this account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanOffer {
    pub id: u64,
    pub currency: String,
    /// Daily interest rate, as a ratio.
    pub rate: Decimal,
    pub amount: Decimal,
    /// Duration in days.
    pub duration: u32,
    pub auto_renew: bool,
    /// Milliseconds since the Unix epoch, when reported.
    pub timestamp: Option<i64>,
}

/// A filled loan, either provided to or used by this account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: u64,
    pub currency: String,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Duration in days.
    pub duration: u32,
    pub auto_renew: bool,
    pub timestamp: Option<i64>,
}

/// Active loans, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveLoans {
    /// Loans this account is providing (lending out).
    pub provided: Vec<Loan>,
    /// Loans this account has taken (margin borrowing).
    pub used: Vec<Loan>,
}

/// A settled entry from the lending history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingRecord {
    pub id: u64,
    pub currency: String,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Duration in days, fractional.
    pub duration: Decimal,
    /// Gross interest accrued.
    pub interest: Decimal,
    /// Exchange's cut of the interest (reported negative by some venues).
    pub fee: Decimal,
    /// Net interest earned.
    pub earned: Decimal,
    /// Loan close time, milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
}
