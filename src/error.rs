use actix_web::error::BlockingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("peer {0} unreachable: {1}")]
    PeerUnreachable(String, reqwest::Error),
    #[error("peer {0} answered with status {1}")]
    PeerStatus(String, u16),
    #[error("chain from peer {0} rejected - Reason: {1}")]
    InvalidChain(String, String),
    #[error("invalid peer address: {0}")]
    InvalidPeerAddress(String),
    #[error("proof-of-work worker failed: {0}")]
    Worker(#[from] BlockingError),
    #[error("invalid value for {0}: {1}")]
    Config(String, String),
}
