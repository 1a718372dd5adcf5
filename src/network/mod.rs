pub mod client;
pub mod peers;

pub use client::PeerClient;
pub use peers::{PeerSet, parse_netloc};

use serde::{Deserialize, Serialize};

use crate::blockchain::Block;

/// Path every node serves its chain on; consensus fetches `http://{peer}/get_bc`.
pub const CHAIN_PATH: &str = "/get_bc";

/// Peer-protocol chain payload. The capitalised keys are part of the wire
/// format shared by every node on the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChain {
    #[serde(rename = "Blockchain")]
    pub chain: Vec<Block>,
    #[serde(rename = "Length")]
    pub length: usize,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }
}
