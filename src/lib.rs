//! cambist — a unified client library for cryptocurrency exchange REST APIs.
//!
//! Exchange responses are normalized into one canonical vocabulary: markets,
//! tickers, order books, candles, trades, orders, balances, and funding
//! transactions, with all numerics as [`rust_decimal::Decimal`]. Exchange
//! error messages are classified into a fixed taxonomy so callers can branch
//! on error kind instead of scraping message strings.
//!
//! # Architecture
//!
//! - [`domain`] — canonical entities, independent of any wire format
//! - [`error`] — the error taxonomy and the two-tier message classifier
//! - [`exchange`] — the unified trait every integration implements
//! - [`transport`] — HTTP dispatch and request signing
//! - [`orders`] — the order cache and lifecycle reconciliation
//! - [`config`] — client configuration
//! - [`poloniex`] — the Poloniex integration
//!
//! # Example
//!
//! ```no_run
//! use cambist::{ClientConfig, Poloniex};
//!
//! # async fn run() -> cambist::Result<()> {
//! let config = ClientConfig::default().with_env_credentials();
//! let client = Poloniex::new(config)?;
//! let ticker = client.fetch_ticker("ETH/BTC").await?;
//! println!("{:?}", ticker.last);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod orders;
pub mod poloniex;
pub mod transport;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use config::{ClientConfig, RoundingMode};
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use exchange::Exchange;
pub use poloniex::Poloniex;
