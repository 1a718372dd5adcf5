use actix_web::{HttpResponse, Responder, get, web};
use log::debug;

use super::models::{AppState, ChainResponse, ValidateResponse};
use super::nodes::resolve_conflicts;
use crate::network::PeerChain;

/// Peer-protocol view of the chain, fetched by other nodes during consensus.
#[get("/get_bc")]
pub async fn get_bc(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PeerChain::new(bc.chain().to_vec()))
}

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        chain: bc.chain(),
        length: bc.len(),
    })
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let valid = bc.is_valid_chain();
    HttpResponse::Ok().json(ValidateResponse {
        valid,
        length: bc.len(),
        message: if valid {
            "blockchain is valid"
        } else {
            "blockchain is invalid"
        },
    })
}

/// Blocks that carry at least one transaction, after syncing with peers.
#[get("/blocks/transactions/")]
pub async fn get_transaction_blocks(state: web::Data<AppState>) -> impl Responder {
    resolve_conflicts(&state).await;

    let bc = state.blockchain.lock().expect("mutex poisoned");
    let blocks: Vec<_> = bc
        .chain()
        .iter()
        .filter(|b| !b.transactions.is_empty())
        .cloned()
        .collect();
    debug!(
        "GET /blocks/transactions/ - {} of {} blocks carry transactions",
        blocks.len(),
        bc.len()
    );
    HttpResponse::Ok().json(ChainResponse {
        length: blocks.len(),
        chain: &blocks,
    })
}
