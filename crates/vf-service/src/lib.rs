//! # vf-service
//!
//! HTTP front end for the VoltForge evaluators. Routes are warp filters over
//! a shared [`Evaluators`] value; see [`routes::api`] for the paths served.

pub mod config;
pub mod routes;

use std::sync::Arc;

use tracing::info;
use warp::Filter;

pub use config::ServiceConfig;
pub use routes::{api, Evaluators, SearchQuery, ThermalQuery, TransistorQuery, MAX_TRIALS};

/// Serve the API on `config.addr` until the process exits.
pub async fn serve(config: ServiceConfig) {
    let addr = config.addr;
    info!(%addr, seed = config.seed, "VoltForge service listening");
    let filter = api(Arc::new(Evaluators::new(config))).with(warp::trace::request());
    warp::serve(filter).run(addr).await;
}
