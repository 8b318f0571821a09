//! JSON-lines request handling
//!
//! One request per line in, one reply per line out. Every reply is written
//! with `serde_json::to_string` on typed values, so `uint`s above
//! `u64::MAX` round-trip as decimal strings.
//!
//! ```text
//! {"kind":"public","sender":"ST1...","method":"deposit","args":[{"uint":"1000000"}]}
//! {"kind":"read_only","method":"get-total-pool-size"}
//! {"kind":"snapshot"}
//! {"kind":"metrics"}
//! ```

use crate::{
    actor::PoolHandle,
    interface::{ClarityValue, PublicCall, PublicCallResult, ReadOnlyCall},
    metrics::Metrics,
    types::{PoolSnapshot, Principal},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Incoming request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// State-mutating contract call
    Public {
        /// Transaction sender
        sender: Principal,
        /// Method name
        method: String,
        /// Arguments
        #[serde(default)]
        args: Vec<ClarityValue>,
    },
    /// Read-only contract call
    ReadOnly {
        /// Method name
        method: String,
        /// Arguments
        #[serde(default)]
        args: Vec<ClarityValue>,
    },
    /// Copy of the pool state
    Snapshot,
    /// Prometheus text exposition
    Metrics,
}

/// Outgoing reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Public call outcome
    Public(PublicCallResult),
    /// Read-only call value
    ReadOnly {
        /// Returned value
        result: ClarityValue,
    },
    /// Pool state
    Snapshot(PoolSnapshot),
    /// Rendered metrics
    Metrics {
        /// Prometheus text format
        metrics: String,
    },
    /// Request could not be served
    Error {
        /// What went wrong
        error: String,
    },
}

/// Serves requests against a running pool actor
#[derive(Debug, Clone)]
pub struct Service {
    handle: PoolHandle,
    metrics: Metrics,
}

impl Service {
    /// Create service over `handle`, rendering `metrics` on request
    pub fn new(handle: PoolHandle, metrics: Metrics) -> Self {
        Self { handle, metrics }
    }

    /// Pool handle backing this service
    pub fn handle(&self) -> &PoolHandle {
        &self.handle
    }

    /// Serve one request line and render the reply line
    pub async fn handle_line(&self, line: &str) -> Result<String> {
        let reply = self.dispatch(line).await;
        Ok(serde_json::to_string(&reply)?)
    }

    /// Serve one request line; failures become [`Reply::Error`]
    pub async fn dispatch(&self, line: &str) -> Reply {
        match self.try_dispatch(line).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Request failed: {}", e);
                Reply::Error {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_dispatch(&self, line: &str) -> Result<Reply> {
        let request: Request =
            serde_json::from_str(line).map_err(|e| Error::MalformedRequest(e.to_string()))?;

        let reply = match request {
            Request::Public {
                sender,
                method,
                args,
            } => {
                let call = PublicCall::parse(&method, &args)?;
                Reply::Public(self.handle.call_public(sender, call).await?)
            }
            Request::ReadOnly { method, args } => {
                let call = ReadOnlyCall::parse(&method, &args)?;
                Reply::ReadOnly {
                    result: self.handle.call_read_only(call).await?,
                }
            }
            Request::Snapshot => Reply::Snapshot(self.handle.snapshot().await?),
            Request::Metrics => Reply::Metrics {
                metrics: self.metrics.render()?,
            },
        };

        Ok(reply)
    }
}
