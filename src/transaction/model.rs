use serde::{Deserialize, Serialize};

/// A value transfer waiting in (or bound into) a block.
///
/// All three fields are opaque strings: `amount` is kept verbatim and never
/// parsed, so `"1.5"`, `"10"` and `"lots"` are all accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: amount.into(),
        }
    }

    /// Placeholder carried by the genesis block.
    pub fn placeholder() -> Self {
        Self::new("-", "-", "0")
    }
}
