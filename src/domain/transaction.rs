//! Deposits and withdrawals.

use rust_decimal::Decimal;

use super::trade::Fee;

/// Funding transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Ok,
    Failed,
    Canceled,
}

/// Funding transaction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

/// A normalized deposit or withdrawal.
///
/// `amount` is always net: where the exchange reports a withdrawal gross of
/// its fee, the normalizer subtracts `fee.cost` before constructing this.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<String>,
    pub currency: String,
    pub amount: Decimal,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub status: TransactionStatus,
    pub tx_type: TransactionType,
    pub txid: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub fee: Option<Fee>,
}

/// A deposit address for one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAddress {
    pub currency: String,
    pub address: String,
    pub tag: Option<String>,
}
