use indexmap::IndexSet;
use reqwest::Url;

use crate::error::{Error, Result};

/// Known peers in registration order.
///
/// Consensus walks peers in this order, so among peers offering equally long
/// valid chains the earliest registered one wins.
#[derive(Debug, Default, Clone)]
pub struct PeerSet {
    peers: IndexSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the address was already known.
    pub fn insert(&mut self, netloc: String) -> bool {
        self.peers.insert(netloc)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }
}

/// Reduce a node address to its `host[:port]` part.
///
/// `http://127.0.0.1:5002/` and `127.0.0.1:5002` both yield `127.0.0.1:5002`.
/// Credentials, path and query are dropped; a port is kept exactly as written,
/// even when it is the scheme default, since peers are always fetched over
/// plain `http://`.
pub fn parse_netloc(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url =
        Url::parse(&with_scheme).map_err(|e| Error::InvalidPeerAddress(format!("{trimmed}: {e}")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidPeerAddress(trimmed.to_string()));
    }

    // Authority as written: `Url::port` hides scheme-default ports.
    let rest = with_scheme
        .split_once("://")
        .map_or(with_scheme.as_str(), |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let netloc = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    Ok(netloc.to_string())
}
