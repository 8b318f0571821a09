//! Actor-based concurrency for the pool
//!
//! One Tokio task owns the [`PoolLedger`]; every call reaches it through a
//! bounded mailbox, so deposits and withdrawals are applied strictly one
//! after another.
//!
//! ```text
//! PoolHandle (Clone) ──mpsc (bounded)──▶ PoolActor ──▶ PoolLedger
//!        ▲                                   │
//!        └────────── oneshot reply ──────────┘
//! ```

use crate::{
    config::{ActorConfig, Config},
    interface::{
        call_public, call_read_only, ClarityValue, PublicCall, PublicCallResult, ReadOnlyCall,
    },
    metrics::Metrics,
    pool::PoolLedger,
    types::{PoolSnapshot, Principal},
    Error, Result,
};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the pool actor
#[derive(Debug)]
pub enum PoolMessage {
    /// Execute a public call
    CallPublic {
        /// Transaction sender
        sender: Principal,
        /// Parsed call
        call: PublicCall,
        /// Reply channel
        response: oneshot::Sender<Result<PublicCallResult>>,
    },

    /// Evaluate a read-only call
    CallReadOnly {
        /// Parsed call
        call: ReadOnlyCall,
        /// Reply channel
        response: oneshot::Sender<ClarityValue>,
    },

    /// Copy the current state
    Snapshot {
        /// Reply channel
        response: oneshot::Sender<PoolSnapshot>,
    },

    /// Shutdown actor, acknowledged once the actor has stopped
    Shutdown {
        /// Reply channel
        response: oneshot::Sender<()>,
    },
}

/// Actor that owns the pool ledger
#[derive(Debug)]
pub struct PoolActor {
    /// Ledger state
    pool: PoolLedger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<PoolMessage>,

    /// Call metrics
    metrics: Metrics,

    /// Verify invariants after each public call
    check_invariants: bool,
}

impl PoolActor {
    /// Create new actor
    pub fn new(
        pool: PoolLedger,
        mailbox: mpsc::Receiver<PoolMessage>,
        metrics: Metrics,
        check_invariants: bool,
    ) -> Self {
        Self {
            pool,
            mailbox,
            metrics,
            check_invariants,
        }
    }

    /// Run the actor event loop until shutdown or all handles are dropped
    pub async fn run(mut self) {
        tracing::info!("Pool actor started for {}", self.pool.contract());

        let mut stop_ack = None;
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                PoolMessage::Shutdown { response } => {
                    stop_ack = Some(response);
                    break;
                }
                msg => self.handle_message(msg),
            }
        }

        tracing::info!(
            "Pool actor stopped: pool size {}, {} participants",
            self.pool.total_pool_size(),
            self.pool.participant_count()
        );

        // Close the mailbox before acknowledging
        drop(self);
        if let Some(ack) = stop_ack {
            let _ = ack.send(());
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: PoolMessage) {
        match msg {
            PoolMessage::CallPublic {
                sender,
                call,
                response,
            } => {
                let result = self.execute_public(&sender, &call);
                if let Err(e) = &result {
                    tracing::error!(
                        "Public call {} from {} failed: {}",
                        call.method(),
                        sender,
                        e
                    );
                }
                let _ = response.send(result);
            }

            PoolMessage::CallReadOnly { call, response } => {
                self.metrics.record_read_only();
                let _ = response.send(call_read_only(&self.pool, &call));
            }

            PoolMessage::Snapshot { response } => {
                let _ = response.send(self.pool.snapshot());
            }

            PoolMessage::Shutdown { .. } => {
                // Handled in run loop
            }
        }
    }

    fn execute_public(
        &mut self,
        sender: &Principal,
        call: &PublicCall,
    ) -> Result<PublicCallResult> {
        let result = call_public(&mut self.pool, sender, call)?;

        match result.result.err_uint() {
            Some(code) => self.metrics.record_rejected(call.method(), code),
            None => match call {
                PublicCall::Deposit { .. } => self.metrics.record_deposit(),
                PublicCall::Withdraw { .. } | PublicCall::WithdrawAll => {
                    self.metrics.record_withdrawal()
                }
            },
        }
        self.metrics
            .update_pool(self.pool.total_pool_size(), self.pool.participant_count());

        if self.check_invariants {
            self.pool.check_invariants()?;
        }

        Ok(result)
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct PoolHandle {
    sender: mpsc::Sender<PoolMessage>,
}

impl PoolHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<PoolMessage>) -> Self {
        Self { sender }
    }

    /// Build an empty pool from `config` and spawn its actor
    pub fn open(config: &Config, metrics: Metrics) -> Result<Self> {
        config.validate()?;
        let deployer = config.contract.deployer_principal()?;
        let pool = PoolLedger::with_contract_name(&deployer, &config.contract.name)?;
        Ok(spawn_pool_actor(pool, metrics, &config.actor))
    }

    /// Execute a public call as `sender`
    pub async fn call_public(
        &self,
        sender: Principal,
        call: PublicCall,
    ) -> Result<PublicCallResult> {
        let (tx, rx) = oneshot::channel();
        self.send(PoolMessage::CallPublic {
            sender,
            call,
            response: tx,
        })
        .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Evaluate a read-only call
    pub async fn call_read_only(&self, call: ReadOnlyCall) -> Result<ClarityValue> {
        let (tx, rx) = oneshot::channel();
        self.send(PoolMessage::CallReadOnly { call, response: tx })
            .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Copy the current pool state
    pub async fn snapshot(&self) -> Result<PoolSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(PoolMessage::Snapshot { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Shutdown actor and wait until it has stopped
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(PoolMessage::Shutdown { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Actor stopped without acknowledging".to_string()))
    }

    async fn send(&self, msg: PoolMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }
}

/// Spawn the pool actor
pub fn spawn_pool_actor(pool: PoolLedger, metrics: Metrics, config: &ActorConfig) -> PoolHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_capacity); // Bounded channel for backpressure
    let actor = PoolActor::new(pool, rx, metrics, config.check_invariants);

    tokio::spawn(async move {
        actor.run().await;
    });

    PoolHandle::new(tx)
}
