//! Poloniex error-message classification tables.

use crate::error::{ApiErrorKind, ErrorClassifier};

/// Messages the exchange emits verbatim.
const EXACT: &[(&str, ApiErrorKind)] = &[
    ("Invalid API key/secret pair.", ApiErrorKind::AuthenticationError),
    ("Permission denied", ApiErrorKind::PermissionDenied),
    ("Connection timed out. Please try again.", ApiErrorKind::RequestTimeout),
    ("Internal error. Please try again.", ApiErrorKind::ExchangeNotAvailable),
    (
        "Order not found, or you are not the person who placed it.",
        ApiErrorKind::OrderNotFound,
    ),
    (
        "Invalid order number, or you are not the person who placed the order.",
        ApiErrorKind::OrderNotFound,
    ),
    (
        "You may only place orders that reduce your position.",
        ApiErrorKind::InvalidOrder,
    ),
    (
        "Please do not make more than 8 API calls per second.",
        ApiErrorKind::DdosProtection,
    ),
    ("Rate must be greater than zero.", ApiErrorKind::InvalidOrder),
    ("This account is frozen.", ApiErrorKind::AccountSuspended),
];

/// Substring table for messages with embedded dynamic values. Scanned in
/// order; more specific needles must stay above more general ones.
const BROAD: &[(&str, ApiErrorKind)] = &[
    ("You have already called cancelOrder", ApiErrorKind::CancelPending),
    ("Nonce must be greater", ApiErrorKind::InvalidNonce),
    ("Total must be at least", ApiErrorKind::InvalidOrder),
    ("Amount must be at least", ApiErrorKind::InvalidOrder),
    ("is either completed or does not exist", ApiErrorKind::OrderNotFound),
    ("Not enough", ApiErrorKind::InsufficientFunds),
];

/// Build the Poloniex classifier.
#[must_use]
pub fn classifier() -> ErrorClassifier {
    ErrorClassifier::new(EXACT, BROAD)
}

/// The exact-match table, exposed for classification tests.
#[must_use]
pub fn exact_table() -> &'static [(&'static str, ApiErrorKind)] {
    EXACT
}

/// The broad-match table, exposed for classification tests.
#[must_use]
pub fn broad_table() -> &'static [(&'static str, ApiErrorKind)] {
    BROAD
}
