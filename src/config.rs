use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PEER_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_NODE_NAME: &str = "NODE 1";
pub const DEFAULT_MINING_REWARD: &str = "1";

/// Node settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single `/get_bc` fetch during consensus.
    pub peer_timeout: Duration,
    pub peer_fetch_concurrency: usize,
    /// Receiver of the reward transaction added by `/mine/`.
    pub node_name: String,
    pub mining_reward: String,
    /// Peers registered at startup, from a comma-separated `PEERS`.
    pub peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
            peer_fetch_concurrency: DEFAULT_PEER_FETCH_CONCURRENCY,
            node_name: DEFAULT_NODE_NAME.to_string(),
            mining_reward: DEFAULT_MINING_REWARD.to_string(),
            peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys fall back to defaults,
    /// malformed numbers are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout_secs = parse_or(&lookup, "PEER_TIMEOUT_SECS", DEFAULT_PEER_TIMEOUT_SECS)?;
        let concurrency = parse_or(
            &lookup,
            "PEER_FETCH_CONCURRENCY",
            DEFAULT_PEER_FETCH_CONCURRENCY,
        )?;
        if concurrency == 0 {
            return Err(Error::Config(
                "PEER_FETCH_CONCURRENCY".into(),
                "must be at least 1".into(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            peer_timeout: Duration::from_secs(timeout_secs),
            peer_fetch_concurrency: concurrency,
            node_name: lookup("NODE_NAME").unwrap_or(defaults.node_name),
            mining_reward: lookup("MINING_REWARD").unwrap_or(defaults.mining_reward),
            peers: lookup("PEERS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(key.to_string(), raw)),
        None => Ok(default),
    }
}
