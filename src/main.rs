mod api;
mod blockchain;
mod config;
mod error;
mod network;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::io;

use api::AppState;
use config::NodeConfig;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(io::Error::other)?;
    let (host, port) = (config.host.clone(), config.port);

    let bootstrap = config.peers.clone();
    let state = web::Data::new(AppState::new(config).map_err(io::Error::other)?);
    {
        let mut bc = state.blockchain.lock().expect("mutex poisoned");
        for address in &bootstrap {
            bc.add_node(address).map_err(io::Error::other)?;
        }
    }
    info!(
        "⛓️ Starting node {} at http://{host}:{port} (peer timeout {:?})",
        state.node_id, state.config.peer_timeout
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
