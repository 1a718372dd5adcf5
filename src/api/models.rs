use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::blockchain::{Block, Blockchain};
use crate::config::NodeConfig;
use crate::error::Result;
use crate::network::PeerClient;
use crate::transaction::Transaction;

/// Shared application state: the ledger behind one lock plus what the
/// handlers need to mine and to talk to peers.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
    pub peers: PeerClient,
    /// Random per-process id, sender of mining rewards.
    pub node_id: String,
    pub config: NodeConfig,
}

impl AppState {
    pub fn new(config: NodeConfig) -> Result<Self> {
        Ok(Self {
            blockchain: Mutex::new(Blockchain::new()),
            peers: PeerClient::new(config.peer_timeout, config.peer_fetch_concurrency)?,
            node_id: Uuid::new_v4().simple().to_string(),
            config,
        })
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub message: &'static str,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
}

impl NewTxRequest {
    /// Whitespace around each field is dropped, nothing else is checked.
    pub fn into_transaction(self) -> Transaction {
        Transaction::new(
            self.sender.trim(),
            self.receiver.trim(),
            self.amount.trim(),
        )
    }
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub replaced: bool,
    pub message: &'static str,
    pub length: usize,
    pub chain: Vec<Block>,
}
