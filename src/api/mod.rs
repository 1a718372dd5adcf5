mod chain;
mod health;
mod mining;
pub mod models;
mod nodes;
mod tx;

use actix_web::http::StatusCode;
use actix_web::web::{self, ServiceConfig};
use actix_web::{HttpResponse, ResponseError};

pub use models::AppState;

use crate::error::Error;

pub fn init_routes(cfg: &mut ServiceConfig) {
    // Peer protocol lives at the root, outside the versioned API.
    cfg.service(chain::get_bc);
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::get_transaction_blocks)
            .service(tx::post_transaction)
            .service(tx::commit_transaction)
            .service(tx::get_pending)
            .service(mining::mine_block)
            .service(nodes::connect_nodes)
            .service(nodes::list_nodes)
            .service(nodes::resolve),
    );
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPeerAddress(_) | Error::InvalidChain(..) => StatusCode::BAD_REQUEST,
            Error::PeerUnreachable(..) | Error::PeerStatus(..) => StatusCode::BAD_GATEWAY,
            Error::EmptyChain | Error::Worker(_) | Error::Config(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
