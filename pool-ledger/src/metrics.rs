//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the pool.
//!
//! # Metrics
//!
//! - `pool_deposits_total` - Accepted deposits
//! - `pool_withdrawals_total` - Accepted withdrawals (including withdraw-all)
//! - `pool_rejected_calls_total` - Public calls answered with `(err ...)`, by code
//! - `pool_read_only_calls_total` - Read-only calls served
//! - `pool_total_size` - Current pool size
//! - `pool_participants` - Current participant count

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Accepted deposits
    pub deposits_total: IntCounter,

    /// Accepted withdrawals
    pub withdrawals_total: IntCounter,

    /// Rejected public calls, labelled by error code
    pub rejected_total: IntCounterVec,

    /// Read-only calls
    pub read_only_total: IntCounter,

    /// Pool size (saturates at i64::MAX)
    pub pool_size: IntGauge,

    /// Active participants
    pub participants: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("deposits_total", &self.deposits_total.get())
            .field("withdrawals_total", &self.withdrawals_total.get())
            .field("read_only_total", &self.read_only_total.get())
            .field("pool_size", &self.pool_size.get())
            .field("participants", &self.participants.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let deposits_total = IntCounter::new("pool_deposits_total", "Accepted deposits")?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total =
            IntCounter::new("pool_withdrawals_total", "Accepted withdrawals")?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new(
                "pool_rejected_calls_total",
                "Public calls answered with an error code",
            ),
            &["method", "code"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let read_only_total =
            IntCounter::new("pool_read_only_calls_total", "Read-only calls served")?;
        registry.register(Box::new(read_only_total.clone()))?;

        let pool_size = IntGauge::new("pool_total_size", "Current pool size in micro-units")?;
        registry.register(Box::new(pool_size.clone()))?;

        let participants = IntGauge::new("pool_participants", "Active participants")?;
        registry.register(Box::new(participants.clone()))?;

        Ok(Self {
            deposits_total,
            withdrawals_total,
            rejected_total,
            read_only_total,
            pool_size,
            participants,
            registry,
        })
    }

    /// Record accepted deposit
    pub fn record_deposit(&self) {
        self.deposits_total.inc();
    }

    /// Record accepted withdrawal
    pub fn record_withdrawal(&self) {
        self.withdrawals_total.inc();
    }

    /// Record a call rejected with `code`
    pub fn record_rejected(&self, method: &str, code: u128) {
        let code = code.to_string();
        self.rejected_total
            .with_label_values(&[method, code.as_str()])
            .inc();
    }

    /// Record read-only call
    pub fn record_read_only(&self) {
        self.read_only_total.inc();
    }

    /// Update pool gauges
    pub fn update_pool(&self, pool_size: u128, participants: u64) {
        self.pool_size.set(i64::try_from(pool_size).unwrap_or(i64::MAX));
        self.participants.set(i64::try_from(participants).unwrap_or(i64::MAX));
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
