use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, ConnectRequest, NodesResponse, ResolveResponse};
use crate::network::parse_netloc;

/// Fetch every known peer's chain and adopt the longest valid one.
///
/// Peers are read under the lock, fetched without it, and the swap happens
/// under the lock again, compared against the chain length at that moment.
pub(crate) async fn resolve_conflicts(state: &AppState) -> bool {
    let peers = {
        let bc = state.blockchain.lock().expect("mutex poisoned");
        if bc.peers().is_empty() {
            return false;
        }
        bc.peers().to_vec()
    };

    let candidates = state.peers.fetch_all(&peers).await;

    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    bc.replace_chain(candidates)
}

/// Register one or more peers by URL.
#[post("/nodes/")]
pub async fn connect_nodes(
    state: web::Data<AppState>,
    body: web::Json<ConnectRequest>,
) -> impl Responder {
    if body.nodes.is_empty() {
        return HttpResponse::BadRequest().body("nodes must list at least one address");
    }

    // Reject the whole request before touching the peer set.
    let parsed: Result<Vec<String>, _> = body.nodes.iter().map(|a| parse_netloc(a)).collect();
    let netlocs = match parsed {
        Ok(netlocs) => netlocs,
        Err(e) => {
            warn!("POST /nodes/ - rejected: {}", e);
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    for netloc in &netlocs {
        bc.insert_peer(netloc.clone());
    }
    info!(
        "POST /nodes/ - {} addresses accepted, {} peers known",
        netlocs.len(),
        bc.peers().len()
    );

    HttpResponse::Created().json(NodesResponse { nodes: netlocs })
}

/// Known peers in registration order.
#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(NodesResponse {
        nodes: bc.peers().to_vec(),
    })
}

/// Run consensus and report whether the local chain was replaced.
#[post("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let replaced = resolve_conflicts(&state).await;

    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ResolveResponse {
        replaced,
        message: if replaced {
            "The chain was replaced by the longest chain in the network"
        } else {
            "This node already holds the longest chain"
        },
        length: bc.len(),
        chain: bc.chain().to_vec(),
    })
}
