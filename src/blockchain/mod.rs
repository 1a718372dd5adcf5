pub mod block;
mod canonical;
pub mod model;
pub mod pow;

pub use block::{Block, hash_block};
pub use model::{Blockchain, is_chain_valid};
pub use pow::{is_valid_proof, proof_of_work};

/// Proof recorded in the genesis block.
pub const GENESIS_PROOF: u64 = 1;

/// `previous_hash` seed of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Fixed Proof-of-Work target: leading hex characters of the puzzle digest.
pub const DIFFICULTY_PREFIX: &str = "0000";
