use std::collections::HashMap;

use thiserror::Error;

/// Classified exchange API errors.
///
/// Every error an exchange reports, whether as an HTTP status or as an
/// `{"error": "..."}` body inside a 200 response, is mapped to exactly one
/// of these kinds. [`ExchangeError`](ApiError::ExchangeError) is the
/// catch-all and carries the raw message for operator diagnosis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("account suspended: {0}")]
    AccountSuspended(String),

    #[error("cancel already pending: {0}")]
    CancelPending(String),

    #[error("request timed out: {0}")]
    RequestTimeout(String),

    #[error("exchange not available: {0}")]
    ExchangeNotAvailable(String),

    #[error("rate limit / DDoS protection triggered: {0}")]
    DdosProtection(String),

    #[error("exchange error: {0}")]
    ExchangeError(String),
}

impl ApiError {
    /// The kind discriminant, independent of the carried message.
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::AuthenticationError(_) => ApiErrorKind::AuthenticationError,
            ApiError::PermissionDenied(_) => ApiErrorKind::PermissionDenied,
            ApiError::InvalidNonce(_) => ApiErrorKind::InvalidNonce,
            ApiError::InsufficientFunds(_) => ApiErrorKind::InsufficientFunds,
            ApiError::InvalidOrder(_) => ApiErrorKind::InvalidOrder,
            ApiError::OrderNotFound(_) => ApiErrorKind::OrderNotFound,
            ApiError::AccountSuspended(_) => ApiErrorKind::AccountSuspended,
            ApiError::CancelPending(_) => ApiErrorKind::CancelPending,
            ApiError::RequestTimeout(_) => ApiErrorKind::RequestTimeout,
            ApiError::ExchangeNotAvailable(_) => ApiErrorKind::ExchangeNotAvailable,
            ApiError::DdosProtection(_) => ApiErrorKind::DdosProtection,
            ApiError::ExchangeError(_) => ApiErrorKind::ExchangeError,
        }
    }
}

/// Kind discriminant used by per-exchange classification tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    AuthenticationError,
    PermissionDenied,
    InvalidNonce,
    InsufficientFunds,
    InvalidOrder,
    OrderNotFound,
    AccountSuspended,
    CancelPending,
    RequestTimeout,
    ExchangeNotAvailable,
    DdosProtection,
    ExchangeError,
}

impl ApiErrorKind {
    /// Materialize an [`ApiError`] of this kind carrying `message`.
    #[must_use]
    pub fn into_error(self, message: impl Into<String>) -> ApiError {
        let message = message.into();
        match self {
            ApiErrorKind::AuthenticationError => ApiError::AuthenticationError(message),
            ApiErrorKind::PermissionDenied => ApiError::PermissionDenied(message),
            ApiErrorKind::InvalidNonce => ApiError::InvalidNonce(message),
            ApiErrorKind::InsufficientFunds => ApiError::InsufficientFunds(message),
            ApiErrorKind::InvalidOrder => ApiError::InvalidOrder(message),
            ApiErrorKind::OrderNotFound => ApiError::OrderNotFound(message),
            ApiErrorKind::AccountSuspended => ApiError::AccountSuspended(message),
            ApiErrorKind::CancelPending => ApiError::CancelPending(message),
            ApiErrorKind::RequestTimeout => ApiError::RequestTimeout(message),
            ApiErrorKind::ExchangeNotAvailable => ApiError::ExchangeNotAvailable(message),
            ApiErrorKind::DdosProtection => ApiError::DdosProtection(message),
            ApiErrorKind::ExchangeError => ApiError::ExchangeError(message),
        }
    }
}

/// Two-tier error-message classifier.
///
/// Exchanges embed dynamic values (order ids, numeric limits) inside
/// otherwise-fixed error sentences, so a single lookup is not enough:
///
/// 1. the message is matched exactly against a literal table;
/// 2. failing that, an ordered substring table is scanned and the first
///    contained needle wins — table order is the tie-break, so more
///    specific substrings must precede more general ones;
/// 3. failing both, the catch-all kind carries the full raw message.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    exact: HashMap<&'static str, ApiErrorKind>,
    broad: Vec<(&'static str, ApiErrorKind)>,
}

impl ErrorClassifier {
    /// Build a classifier from an exact-match table and an ordered
    /// broad-match (substring) table.
    #[must_use]
    pub fn new(
        exact: &[(&'static str, ApiErrorKind)],
        broad: &[(&'static str, ApiErrorKind)],
    ) -> Self {
        Self {
            exact: exact.iter().copied().collect(),
            broad: broad.to_vec(),
        }
    }

    /// Classify a raw error message into an [`ApiError`].
    #[must_use]
    pub fn classify(&self, message: &str) -> ApiError {
        if let Some(kind) = self.exact.get(message) {
            return kind.into_error(message);
        }
        for (needle, kind) in &self.broad {
            if message.contains(needle) {
                return kind.into_error(message);
            }
        }
        ApiError::ExchangeError(message.to_string())
    }
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("missing credentials: {0} is required for private endpoints")]
    MissingCredentials(&'static str),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The classified API error, if this is one.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ErrorClassifier {
        ErrorClassifier::new(
            &[("Permission denied", ApiErrorKind::PermissionDenied)],
            &[
                ("Total must be at least", ApiErrorKind::InvalidOrder),
                ("Not enough", ApiErrorKind::InsufficientFunds),
            ],
        )
    }

    #[test]
    fn exact_match_wins_over_broad() {
        let c = classifier();
        let err = c.classify("Permission denied");
        assert_eq!(err.kind(), ApiErrorKind::PermissionDenied);
    }

    #[test]
    fn broad_match_finds_embedded_substring() {
        let c = classifier();
        let err = c.classify("Total must be at least 0.0001.");
        assert_eq!(err.kind(), ApiErrorKind::InvalidOrder);
    }

    #[test]
    fn broad_table_order_breaks_ties() {
        let c = classifier();
        // Contains both needles; the earlier table entry must win.
        let err = c.classify("Total must be at least 0.0001. Not enough BTC.");
        assert_eq!(err.kind(), ApiErrorKind::InvalidOrder);
    }

    #[test]
    fn unmapped_message_falls_through_to_catch_all() {
        let c = classifier();
        let err = c.classify("something entirely new");
        assert_eq!(err, ApiError::ExchangeError("something entirely new".into()));
    }

    #[test]
    fn kind_round_trips_through_into_error() {
        for kind in [
            ApiErrorKind::AuthenticationError,
            ApiErrorKind::PermissionDenied,
            ApiErrorKind::InvalidNonce,
            ApiErrorKind::InsufficientFunds,
            ApiErrorKind::InvalidOrder,
            ApiErrorKind::OrderNotFound,
            ApiErrorKind::AccountSuspended,
            ApiErrorKind::CancelPending,
            ApiErrorKind::RequestTimeout,
            ApiErrorKind::ExchangeNotAvailable,
            ApiErrorKind::DdosProtection,
            ApiErrorKind::ExchangeError,
        ] {
            assert_eq!(kind.into_error("msg").kind(), kind);
        }
    }
}
