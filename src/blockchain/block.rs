use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::canonical::to_sorted_json;
use super::pow::sha256_hex;
use crate::transaction::Transaction;

/// A sealed block. Field names are part of the wire format and of the hash
/// preimage, so they must not be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String, // local wall-clock, see `format_timestamp`
    pub proof: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block stamped with the current local time.
    pub fn new(
        index: u64,
        proof: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self::new_with_timestamp(index, proof, previous_hash, transactions, now_timestamp())
    }

    pub fn new_with_timestamp(
        index: u64,
        proof: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        timestamp: String,
    ) -> Self {
        Self {
            index,
            timestamp,
            proof,
            previous_hash,
            transactions,
        }
    }

    /// SHA-256 over the key-sorted JSON encoding of every field.
    pub fn compute_hash(&self) -> String {
        let encoded = to_sorted_json(self).expect("block fields are always serializable");
        sha256_hex(&encoded)
    }
}

/// Canonical hash of `block`; this is what the next block's `previous_hash`
/// must carry.
pub fn hash_block(block: &Block) -> String {
    block.compute_hash()
}

/// `YYYY-MM-DD HH:MM:SS.ffffff`, dropping the fraction when it is zero.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    let micros = (at.nanosecond() / 1_000) % 1_000_000;
    let seconds = at.format("%Y-%m-%d %H:%M:%S");
    if micros == 0 {
        seconds.to_string()
    } else {
        format!("{seconds}.{micros:06}")
    }
}

pub fn now_timestamp() -> String {
    format_timestamp(Local::now().naive_local())
}
