//! Canonical entities, independent of any single exchange's wire format.
//!
//! - [`market`] — markets, precision/limits, the bidirectional registry
//! - [`currency`] — listed currencies
//! - [`ticker`] — 24h ticker snapshots
//! - [`orderbook`] — price-level order books
//! - [`ohlcv`] — candles and timeframes
//! - [`trade`] — executed trades and fee derivation
//! - [`order`] — orders and the open → closed/canceled state machine
//! - [`balance`] — per-asset balances and per-wallet-type balances
//! - [`transaction`] — deposits and withdrawals
//! - [`loan`] — lending offers, active loans, loan books

pub mod balance;
pub mod currency;
pub mod loan;
pub mod market;
pub mod ohlcv;
pub mod order;
pub mod orderbook;
pub mod ticker;
pub mod trade;
pub mod transaction;

pub use balance::{Balance, Balances, WalletBalances, WalletEntry, WalletType};
pub use currency::Currency;
pub use loan::{ActiveLoans, LendingRecord, Loan, LoanBook, LoanBookEntry, LoanOffer};
pub use market::{Limits, Market, MarketRegistry, MinMax, Precision};
pub use ohlcv::{Candle, Timeframe};
pub use order::{Order, OrderStatus, OrderType, Side};
pub use orderbook::OrderBook;
pub use ticker::Ticker;
pub use trade::{Fee, TakerOrMaker, Trade};
pub use transaction::{DepositAddress, Transaction, TransactionStatus, TransactionType};
