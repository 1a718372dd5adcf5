use log::{debug, info, warn};

use super::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF, hash_block, is_valid_proof};
use crate::error::{Error, Result};
use crate::network::{PeerChain, PeerSet, parse_netloc};
use crate::transaction::Transaction;

/// In-memory ledger: the chain, the transactions waiting for the next block
/// and the peers consulted during consensus.
///
/// Not synchronised by itself; the node keeps it behind a single `Mutex`.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    peers: PeerSet,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new blockchain with a genesis block carrying the
    /// placeholder transaction.
    pub fn new() -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            pending: vec![Transaction::placeholder()],
            peers: PeerSet::new(),
        };
        bc.create_block(GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string());
        bc
    }

    /// Append a block sealed with `proof`, moving every pending transaction
    /// into it.
    pub fn create_block(&mut self, proof: u64, previous_hash: String) -> &Block {
        let index = self.chain.len() as u64 + 1;
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(index, proof, previous_hash, transactions);
        debug!(
            "LEDGER - block #{} created with {} txs (proof={})",
            block.index,
            block.transactions.len(),
            block.proof
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Return the last block in the chain.
    pub fn get_previous_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(Error::EmptyChain)
    }

    /// Commit a proof found against the block hashing to `previous_hash`.
    ///
    /// Returns `Ok(None)` without touching the ledger when the tail is no
    /// longer that block. Otherwise `extra` is queued and the block created,
    /// so both happen under the same exclusive borrow.
    pub fn append_sealed(
        &mut self,
        proof: u64,
        previous_hash: String,
        extra: Option<Transaction>,
    ) -> Result<Option<&Block>> {
        if hash_block(self.get_previous_block()?) != previous_hash {
            return Ok(None);
        }
        if let Some(tx) = extra {
            self.queue(tx);
        }
        Ok(Some(self.create_block(proof, previous_hash)))
    }

    /// Run Proof-of-Work against the tail and append the result, holding
    /// `&mut self` for the whole search.
    #[cfg(test)]
    pub fn mine_block(&mut self) -> Result<&Block> {
        let previous = self.get_previous_block()?;
        let proof = super::proof_of_work(previous.proof);
        let previous_hash = hash_block(previous);
        Ok(self.create_block(proof, previous_hash))
    }

    /// Queue a transaction and return the index of the block expected to
    /// include it. The index is a hint only; nothing is reserved.
    pub fn add_transaction(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<String>,
    ) -> u64 {
        self.queue(Transaction::new(sender, receiver, amount))
    }

    /// Same as `add_transaction` for an already built transaction.
    pub fn queue(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        self.chain.len() as u64 + 1
    }

    /// Register a peer by URL; only its `host:port` is kept.
    /// Returns the stored address (also when it was already known).
    pub fn add_node(&mut self, address: &str) -> Result<String> {
        let netloc = parse_netloc(address)?;
        self.insert_peer(netloc.clone());
        Ok(netloc)
    }

    /// Register an address already reduced by `parse_netloc`.
    /// Returns `false` if it was known.
    pub fn insert_peer(&mut self, netloc: String) -> bool {
        let added = self.peers.insert(netloc.clone());
        if added {
            info!("PEERS - registered {} ({} known)", netloc, self.peers.len());
        } else {
            debug!("PEERS - {} already known", netloc);
        }
        added
    }

    /// Longest-chain rule over chains already fetched from peers.
    ///
    /// A candidate qualifies when its length beats the best seen so far
    /// (starting from our own) and it validates. Only strictly longer chains
    /// raise the bar, so on ties the earlier candidate is kept. The local
    /// chain is swapped wholesale or left untouched.
    pub fn replace_chain<I>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = (String, PeerChain)>,
    {
        let mut max_length = self.chain.len();
        let mut longest: Option<(String, Vec<Block>)> = None;

        for (peer, candidate) in candidates {
            if candidate.length <= max_length {
                debug!(
                    "CONSENSUS - {} length {} does not beat {}",
                    peer, candidate.length, max_length
                );
                continue;
            }
            if let Err(e) = check_candidate(&peer, &candidate) {
                warn!("CONSENSUS - {}", e);
                continue;
            }
            max_length = candidate.length;
            longest = Some((peer, candidate.chain));
        }

        match longest {
            Some((peer, chain)) => {
                info!(
                    "CONSENSUS - replacing local chain ({} blocks) with {} blocks from {}",
                    self.chain.len(),
                    chain.len(),
                    peer
                );
                self.chain = chain;
                true
            }
            None => false,
        }
    }

    pub fn is_valid_chain(&self) -> bool {
        is_chain_valid(&self.chain)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

fn check_candidate(peer: &str, candidate: &PeerChain) -> Result<()> {
    if candidate.chain.len() != candidate.length {
        return Err(Error::InvalidChain(
            peer.to_string(),
            format!(
                "reported length {} but sent {} blocks",
                candidate.length,
                candidate.chain.len()
            ),
        ));
    }
    if !is_chain_valid(&candidate.chain) {
        return Err(Error::InvalidChain(
            peer.to_string(),
            "hash links or proofs do not verify".into(),
        ));
    }
    Ok(())
}

/// Validate linkage and Proof-of-Work of every block after the first,
/// using the stored proofs. An empty chain is never valid.
pub fn is_chain_valid(chain: &[Block]) -> bool {
    if chain.is_empty() {
        return false;
    }

    for pair in chain.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);

        // Check linkage
        if current.previous_hash != hash_block(prev) {
            return false;
        }

        // Check proof against the predecessor's proof
        if !is_valid_proof(current.proof, prev.proof) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::proof_of_work;
    use std::sync::OnceLock;

    /// Chain of `len` blocks mined from a fresh ledger, one transaction each.
    fn mined_chain(len: usize) -> Vec<Block> {
        let mut bc = Blockchain::new();
        while bc.len() < len {
            bc.add_transaction("alice", "bob", format!("{}", bc.len()));
            bc.mine_block().unwrap();
        }
        bc.chain().to_vec()
    }

    // Mining is deterministic in proofs, so share one long chain across tests.
    fn chain_of_six() -> &'static [Block] {
        static CHAIN: OnceLock<Vec<Block>> = OnceLock::new();
        CHAIN.get_or_init(|| mined_chain(6))
    }

    #[test]
    fn genesis_invariant() {
        let bc = Blockchain::new();
        assert_eq!(bc.len(), 1);
        let genesis = &bc.chain()[0];
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.proof, 1);
        assert_eq!(genesis.transactions, vec![Transaction::placeholder()]);
        assert!(bc.pending_transactions().is_empty());
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn create_block_drains_queue_in_order() {
        let mut bc = Blockchain::new();
        assert_eq!(bc.add_transaction("a", "b", "1"), 2);
        assert_eq!(bc.add_transaction("c", "d", "2"), 2);

        let prev_hash = hash_block(bc.get_previous_block().unwrap());
        let block = bc.create_block(533, prev_hash.clone()).clone();

        assert_eq!(block.index, 2);
        assert_eq!(block.previous_hash, prev_hash);
        assert_eq!(
            block.transactions,
            vec![Transaction::new("a", "b", "1"), Transaction::new("c", "d", "2")]
        );
        assert!(bc.pending_transactions().is_empty());
        assert_eq!(bc.add_transaction("e", "f", "3"), 3);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn empty_block_is_allowed() {
        let mut bc = Blockchain::new();
        let block = bc.mine_block().unwrap();
        assert!(block.transactions.is_empty());
        assert_eq!(block.proof, 533);
    }

    #[test]
    fn previous_block_is_tail() {
        let mut bc = Blockchain::new();
        bc.mine_block().unwrap();
        assert_eq!(bc.get_previous_block().unwrap().index, 2);
    }

    #[test]
    fn previous_block_of_empty_chain_errors() {
        let mut bc = Blockchain::new();
        bc.chain.clear();
        assert!(matches!(bc.get_previous_block(), Err(Error::EmptyChain)));
        assert!(matches!(bc.mine_block(), Err(Error::EmptyChain)));
    }

    #[test]
    fn append_sealed_commits_against_current_tail() {
        let mut bc = Blockchain::new();
        let tip = hash_block(bc.get_previous_block().unwrap());
        bc.add_transaction("a", "b", "1");

        let block = bc
            .append_sealed(533, tip, Some(Transaction::new("node", "NODE 1", "1")))
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(block.index, 2);
        assert_eq!(
            block.transactions,
            vec![Transaction::new("a", "b", "1"), Transaction::new("node", "NODE 1", "1")]
        );
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn append_sealed_refuses_stale_tail() {
        let mut bc = Blockchain::new();
        let stale_tip = hash_block(bc.get_previous_block().unwrap());
        let stale_proof = proof_of_work(bc.get_previous_block().unwrap().proof);

        // Another block lands while the proof was being searched.
        bc.mine_block().unwrap();
        bc.add_transaction("c", "d", "2");

        let outcome = bc
            .append_sealed(stale_proof, stale_tip, Some(Transaction::new("a", "b", "1")))
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(bc.len(), 2);
        assert_eq!(bc.pending_transactions(), &[Transaction::new("c", "d", "2")]);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn mined_chain_is_valid() {
        assert!(is_chain_valid(chain_of_six()));
        assert!(is_chain_valid(&chain_of_six()[..1]));
        assert!(!is_chain_valid(&[]));
    }

    #[test]
    fn tampering_breaks_validity() {
        let chain = chain_of_six();

        let mut c = chain.to_vec();
        c[3].previous_hash = "f".repeat(64);
        assert!(!is_chain_valid(&c));

        let mut c = chain.to_vec();
        c[3].proof += 1;
        assert!(!is_chain_valid(&c));

        let mut c = chain.to_vec();
        c[2].transactions[0].amount = "1000000".into();
        assert!(!is_chain_valid(&c));

        let mut c = chain.to_vec();
        c[1].transactions.push(Transaction::new("mallory", "mallory", "5"));
        assert!(!is_chain_valid(&c));
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut bc = Blockchain::new();
        assert_eq!(bc.add_node("http://127.0.0.1:5002/").unwrap(), "127.0.0.1:5002");
        assert_eq!(bc.add_node("http://127.0.0.1:5002").unwrap(), "127.0.0.1:5002");
        assert_eq!(bc.peers().len(), 1);
        assert!(bc.add_node("http://").is_err());
        assert_eq!(bc.peers().len(), 1);

        assert!(!bc.insert_peer("127.0.0.1:5002".into()));
        assert!(bc.insert_peer("127.0.0.1:5003".into()));
        assert_eq!(bc.peers().to_vec(), vec!["127.0.0.1:5002", "127.0.0.1:5003"]);
    }

    #[test]
    fn replace_with_longest_valid_chain() {
        let mut bc = Blockchain::new();
        bc.mine_block().unwrap();
        assert_eq!(bc.len(), 2);

        let valid = chain_of_six()[..5].to_vec();
        let mut forged = chain_of_six().to_vec();
        forged[4].proof = 7;

        let replaced = bc.replace_chain(vec![
            ("peer-a:5000".to_string(), PeerChain::new(valid.clone())),
            ("peer-b:5000".to_string(), PeerChain::new(forged)),
        ]);

        assert!(replaced);
        assert_eq!(bc.chain(), valid.as_slice());
    }

    #[test]
    fn keep_chain_when_nobody_is_longer() {
        let mut bc = Blockchain::new();
        bc.mine_block().unwrap();
        let before = bc.chain().to_vec();

        let replaced = bc.replace_chain(vec![
            ("peer-a:5000".to_string(), PeerChain::new(chain_of_six()[..2].to_vec())),
            ("peer-b:5000".to_string(), PeerChain::new(chain_of_six()[..1].to_vec())),
        ]);

        assert!(!replaced);
        assert_eq!(bc.chain(), before.as_slice());
    }

    #[test]
    fn no_candidates_is_a_no_op() {
        let mut bc = Blockchain::new();
        assert!(!bc.replace_chain(Vec::new()));
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn inflated_length_is_rejected() {
        let mut bc = Blockchain::new();
        let mut lying = PeerChain::new(chain_of_six()[..2].to_vec());
        lying.length = 50;

        assert!(!bc.replace_chain(vec![("liar:1".to_string(), lying)]));
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn longest_wins_and_ties_keep_first() {
        let first = chain_of_six()[..4].to_vec();

        // Same length as `first` but a different history.
        let mut fork = Blockchain::new();
        fork.add_transaction("x", "y", "z");
        for _ in 0..3 {
            fork.mine_block().unwrap();
        }
        let second = fork.chain().to_vec();
        assert_eq!(second.len(), first.len());
        assert_ne!(second, first);

        let mut bc = Blockchain::new();
        let replaced = bc.replace_chain(vec![
            ("short:1".to_string(), PeerChain::new(chain_of_six()[..3].to_vec())),
            ("first:1".to_string(), PeerChain::new(first.clone())),
            ("second:1".to_string(), PeerChain::new(second)),
        ]);

        assert!(replaced);
        assert_eq!(bc.chain(), first.as_slice());
    }
}
