use actix_web::{HttpResponse, post, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::models::AppState;
use crate::blockchain::{Block, hash_block, proof_of_work};
use crate::error::Result;
use crate::transaction::Transaction;

/// Seal the pending transactions into a new block.
///
/// Proof-of-Work runs on the blocking pool without the ledger lock. The lock
/// is taken again to commit, and if the tail moved meanwhile (another block
/// was mined or consensus replaced the chain) the search restarts from the
/// new tail. `extra` is queued at commit time, so it lands in the sealed block.
pub(crate) async fn seal_block(state: &AppState, extra: Option<Transaction>) -> Result<Block> {
    loop {
        let (previous_proof, previous_hash) = {
            let bc = state.blockchain.lock().expect("mutex poisoned");
            let previous = bc.get_previous_block()?;
            (previous.proof, hash_block(previous))
        };

        let t0 = Instant::now();
        let proof = web::block(move || proof_of_work(previous_proof)).await?;
        debug!(
            "MINER - proof {} found against {} in {} ms",
            proof,
            previous_proof,
            t0.elapsed().as_millis()
        );

        let mut bc = state.blockchain.lock().expect("mutex poisoned");
        let Some(block) = bc.append_sealed(proof, previous_hash, extra.clone())? else {
            warn!("MINER - chain tip moved during proof-of-work, searching again");
            continue;
        };
        let block = block.clone();
        info!(
            "MINER - sealed block #{} with {} txs",
            block.index,
            block.transactions.len()
        );
        return Ok(block);
    }
}

/// Mine a block from the pending queue plus a reward for this node.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse> {
    let reward = Transaction::new(
        state.node_id.clone(),
        state.config.node_name.clone(),
        state.config.mining_reward.clone(),
    );
    let block = seal_block(&state, Some(reward)).await?;
    Ok(HttpResponse::Ok().json(block))
}
