//! A scripted [`Transport`] returning canned responses in order.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::transport::{Api, Params, Transport};

/// One call a [`ScriptedTransport`] received, for later assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub api: Api,
    pub command: String,
    pub params: Params,
}

impl RecordedCall {
    /// The value of a named parameter, if the call carried it.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// [`Transport`] double that pops pre-scripted responses and records every
/// call it receives. Running out of script is an error, so a test that
/// triggers an unexpected extra request fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<Value, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn push_ok(&self, value: Value) {
        self.responses.lock().push_back(Ok(value));
    }

    /// Queue a transport-level failure.
    pub fn push_err(&self, err: ApiError) {
        self.responses.lock().push_back(Err(err));
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Responses still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, api: Api, command: &str, params: Params) -> Result<Value> {
        self.calls.lock().push(RecordedCall {
            api,
            command: command.to_string(),
            params,
        });
        match self.responses.lock().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err.into()),
            None => Err(ApiError::ExchangeNotAvailable(format!(
                "no scripted response left for '{command}'"
            ))
            .into()),
        }
    }
}
