use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;

use super::mining::seal_block;
use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::Result;

/// Queue a transaction for the next block.
#[post("/transactions/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let tx = body.into_inner().into_transaction();
    let index = {
        let mut bc = state.blockchain.lock().expect("mutex poisoned");
        let index = bc.queue(tx);
        debug!(
            "POST /transactions/ - queued, pending size {}",
            bc.pending_transactions().len()
        );
        index
    };

    HttpResponse::Created().json(NewTxResponse {
        message: format!("This transaction will be added to block {index}"),
        index,
    })
}

/// Seal a transaction right away, returning the block that holds it.
///
/// The transaction is queued only once a proof has been found, so a
/// concurrent seal cannot carry it off into another block.
#[post("/transactions/commit/")]
pub async fn commit_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse> {
    let tx = body.into_inner().into_transaction();
    let block = seal_block(&state, Some(tx)).await?;
    Ok(HttpResponse::Ok().json(block))
}

/// Transactions waiting for the next block.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let transactions = bc.pending_transactions().to_vec();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
