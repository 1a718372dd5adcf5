use futures::stream::{self, StreamExt};
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use super::{CHAIN_PATH, PeerChain};
use crate::error::{Error, Result};

/// HTTP client used during consensus to pull chains from peers.
#[derive(Clone)]
pub struct PeerClient {
    http: Client,
    concurrency: usize,
}

impl PeerClient {
    /// `timeout` bounds each peer request end to end; at most `concurrency`
    /// peers are contacted at once.
    pub fn new(timeout: Duration, concurrency: usize) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::PeerUnreachable("<client>".into(), e))?;
        Ok(Self {
            http,
            concurrency: concurrency.max(1),
        })
    }

    /// Fetch `{Blockchain, Length}` from one peer.
    pub async fn fetch_chain(&self, peer: &str) -> Result<PeerChain> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::PeerUnreachable(peer.to_string(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::PeerStatus(peer.to_string(), status.as_u16()));
        }

        resp.json::<PeerChain>()
            .await
            .map_err(|e| Error::PeerUnreachable(peer.to_string(), e))
    }

    /// Fetch every peer's chain. Peers that fail are logged and left out;
    /// the result keeps the order of `peers`.
    pub async fn fetch_all(&self, peers: &[String]) -> Vec<(String, PeerChain)> {
        stream::iter(peers.iter().cloned())
            .map(|peer| async move {
                let outcome = self.fetch_chain(&peer).await;
                (peer, outcome)
            })
            .buffered(self.concurrency)
            .filter_map(|(peer, outcome)| async move {
                match outcome {
                    Ok(chain) => {
                        debug!("CONSENSUS - {} reported length {}", peer, chain.length);
                        Some((peer, chain))
                    }
                    Err(e) => {
                        warn!("CONSENSUS - skipping peer: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await
    }
}
