//! HTTP transport and request signing.
//!
//! The [`Transport`] trait is the seam between the normalization layer and
//! the network: it takes an API family, a command name, and parameters, and
//! yields the raw response JSON or a classified transport error. The
//! [`HttpTransport`] implementation signs trading-API requests with
//! HMAC-SHA512 and a monotonically increasing nonce.
//!
//! Nothing is retried here; retry policy belongs to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha512;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Which API family a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Unauthenticated market-data endpoints (GET).
    Public,
    /// Authenticated trading endpoints (signed POST).
    Trading,
}

/// Request parameters as ordered key/value pairs.
pub type Params = Vec<(String, String)>;

/// Dispatcher contract consumed by exchange clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one API call and return the parsed response body.
    ///
    /// Transport-level failures (timeouts, 5xx, malformed JSON) surface as
    /// [`ApiError::RequestTimeout`] / [`ApiError::ExchangeNotAvailable`].
    /// Business errors embedded in a 200 body are NOT interpreted here;
    /// the caller classifies them.
    async fn call(&self, api: Api, command: &str, params: Params) -> Result<Value>;
}

/// Serialize parameters as a form-encoded query string.
pub fn build_query(params: &Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// reqwest-backed [`Transport`] with HMAC-SHA512 signing.
pub struct HttpTransport {
    client: reqwest::Client,
    public_url: String,
    trading_url: String,
    api_key: Option<String>,
    secret: Option<String>,
    nonce: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        // Nonces must outrun any earlier session; epoch milliseconds do.
        let seed = chrono::Utc::now().timestamp_millis() as u64;
        Ok(Self {
            client,
            public_url: config.public_url.clone(),
            trading_url: config.trading_url.clone(),
            api_key: config.api_key.clone(),
            secret: config.secret.clone(),
            nonce: AtomicU64::new(seed),
        })
    }

    fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// HMAC-SHA512 of the form body, hex-encoded.
    fn sign(&self, body: &str) -> Result<String> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(Error::MissingCredentials("secret"))?;
        let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
            .map_err(|_| Error::MissingCredentials("secret"))?;
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            ApiError::RequestTimeout(err.to_string()).into()
        } else if err.is_connect() {
            ApiError::ExchangeNotAvailable(err.to_string()).into()
        } else {
            Error::Http(err)
        }
    }

    fn decode(status: reqwest::StatusCode, body: &str) -> Result<Value> {
        match serde_json::from_str::<Value>(body) {
            // A well-formed body is returned even under a 4xx status so the
            // caller can classify an embedded `{"error": ...}` message.
            Ok(value) => Ok(value),
            Err(_) if status.is_server_error() || !status.is_success() => {
                Err(ApiError::ExchangeNotAvailable(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    truncate(body, 256)
                ))
                .into())
            }
            Err(_) => Err(ApiError::ExchangeNotAvailable(format!(
                "malformed JSON response: {}",
                truncate(body, 256)
            ))
            .into()),
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, api: Api, command: &str, mut params: Params) -> Result<Value> {
        let response = match api {
            Api::Public => {
                params.insert(0, ("command".into(), command.into()));
                let url = format!("{}?{}", self.public_url, build_query(&params));
                debug!(%command, %url, "public API call");
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?
            }
            Api::Trading => {
                let api_key = self
                    .api_key
                    .as_deref()
                    .ok_or(Error::MissingCredentials("api_key"))?;
                params.insert(0, ("command".into(), command.into()));
                params.push(("nonce".into(), self.next_nonce().to_string()));
                let body = build_query(&params);
                let signature = self.sign(&body)?;
                debug!(%command, "trading API call");
                self.client
                    .post(&self.trading_url)
                    .header("Key", api_key)
                    .header("Sign", signature)
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(body)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(Self::map_send_error)?;
        Self::decode(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_with_secret(secret: &str) -> HttpTransport {
        let config = ClientConfig {
            api_key: Some("key".into()),
            secret: Some(secret.into()),
            ..Default::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn build_query_encodes_pairs_in_order() {
        let params = vec![
            ("command".to_string(), "buy".to_string()),
            ("currencyPair".to_string(), "BTC_ETH".to_string()),
            ("rate".to_string(), "0.01".to_string()),
        ];
        assert_eq!(build_query(&params), "command=buy&currencyPair=BTC_ETH&rate=0.01");
    }

    #[test]
    fn signature_is_deterministic_and_hex_sha512() {
        let transport = transport_with_secret("secret");
        let sig1 = transport.sign("command=returnBalances&nonce=1").unwrap();
        let sig2 = transport.sign("command=returnBalances&nonce=1").unwrap();
        assert_eq!(sig1, sig2);
        // SHA-512 digest is 64 bytes, 128 hex characters.
        assert_eq!(sig1.len(), 128);
        assert!(sig1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_changes_with_body() {
        let transport = transport_with_secret("secret");
        let sig1 = transport.sign("nonce=1").unwrap();
        let sig2 = transport.sign("nonce=2").unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn signing_without_secret_fails() {
        let config = ClientConfig::default();
        let transport = HttpTransport::new(&config).unwrap();
        assert!(matches!(
            transport.sign("nonce=1"),
            Err(Error::MissingCredentials("secret"))
        ));
    }

    #[test]
    fn nonces_increase_monotonically() {
        let transport = transport_with_secret("secret");
        let first = transport.next_nonce();
        let second = transport.next_nonce();
        assert!(second > first);
    }

    #[test]
    fn decode_returns_json_even_under_client_error_status() {
        let value =
            HttpTransport::decode(reqwest::StatusCode::FORBIDDEN, r#"{"error":"Permission denied"}"#)
                .unwrap();
        assert_eq!(value["error"], "Permission denied");
    }

    #[test]
    fn decode_maps_malformed_body_to_exchange_not_available() {
        let err = HttpTransport::decode(reqwest::StatusCode::BAD_GATEWAY, "<html>502</html>")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::ExchangeNotAvailable(_))
        ));
    }
}
