//! HTTP routes over the evaluators, built from warp filters.
//!
//! Every evaluation runs on the blocking pool so CPU-bound work never stalls
//! the runtime's worker threads.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use vf_physics::{uniform_grid, DeviceModel, ThermalSolver};
use vf_search::{
    AmplitudeSampler, OptimizerConfig, StochasticOptimizer, DEFAULT_DIM, DEFAULT_TRIALS,
};
use vf_types::{config_error, invalid_input, BiasPoint, DesignParameters, VfError, VfResult};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection};

use crate::config::ServiceConfig;

/// Largest `trials` a single optimize request may ask for.
pub const MAX_TRIALS: usize = 1 << 20;

const THERMAL_GRID_END: f64 = 10.0;
const THERMAL_GRID_POINTS: usize = 100;
const DEFAULT_POWER: f64 = 0.1;

type JsonReply = WithStatus<Json>;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransistorQuery {
    pub vgs: f64,
    pub vds: f64,
    pub temp: f64,
}

impl Default for TransistorQuery {
    fn default() -> Self {
        let bias = BiasPoint::default();
        Self {
            vgs: bias.gate_voltage,
            vds: bias.drain_voltage,
            temp: bias.temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThermalQuery {
    pub power: f64,
}

impl Default for ThermalQuery {
    fn default() -> Self {
        Self {
            power: DEFAULT_POWER,
        }
    }
}

/// Query of both search routes; `trials` and `seed` only matter to optimize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Comma separated design parameters.
    pub params: String,
    pub dim: usize,
    pub trials: usize,
    pub seed: Option<u64>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            params: String::new(),
            dim: DEFAULT_DIM,
            trials: DEFAULT_TRIALS,
            seed: None,
        }
    }
}

impl SearchQuery {
    /// An empty list is valid; evaluators treat missing entries as zero.
    pub fn design_parameters(&self) -> VfResult<DesignParameters> {
        let values = self
            .params
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|e| config_error!("params entry {s:?}: {e}"))
            })
            .collect::<VfResult<Vec<_>>>()?;
        DesignParameters::new(values)
    }
}

/// Evaluators shared by every request.
#[derive(Debug, Clone, Default)]
pub struct Evaluators {
    config: ServiceConfig,
    device: DeviceModel,
    thermal: ThermalSolver,
    sampler: AmplitudeSampler,
}

impl Evaluators {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn transistor(&self, query: &TransistorQuery) -> VfResult<Value> {
        let bias = BiasPoint::new(query.vgs, query.vds, query.temp);
        let result = self.device.simulate_bias(&bias)?;
        Ok(serde_json::to_value(result)?)
    }

    pub fn thermal(&self, query: &ThermalQuery) -> VfResult<Value> {
        let grid = uniform_grid(0.0, THERMAL_GRID_END, THERMAL_GRID_POINTS)?;
        let trajectory = self.thermal.integrate(query.power, &grid)?;
        Ok(serde_json::to_value(trajectory)?)
    }

    pub fn evaluate(&self, query: &SearchQuery) -> VfResult<Value> {
        let params = query.design_parameters()?;
        let report = self.sampler.evaluate_dim(&params, query.dim)?;
        Ok(serde_json::to_value(report)?)
    }

    pub fn optimize(&self, query: &SearchQuery) -> VfResult<Value> {
        if query.trials > MAX_TRIALS {
            return Err(invalid_input!(
                "trials must be at most {MAX_TRIALS}, got {}",
                query.trials
            ));
        }
        let params = query.design_parameters()?;
        let config = OptimizerConfig::default()
            .with_dim(query.dim)
            .with_trials(query.trials)
            .with_seed(query.seed.unwrap_or(self.config.seed));
        let outcome = StochasticOptimizer::new(config).optimize(&params)?;
        Ok(serde_json::to_value(outcome)?)
    }
}

pub fn status_for(err: &VfError) -> StatusCode {
    match err {
        VfError::Config(_) => StatusCode::BAD_REQUEST,
        VfError::InvalidInput { .. } | VfError::NumericDegeneracy { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        VfError::Io(_) | VfError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(status: StatusCode, message: String) -> JsonReply {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

/// The full API: `/health`, `/simulate/*` and `/search/*`, GET only.
pub fn api(
    evaluators: Arc<Evaluators>,
) -> impl Filter<Extract = (JsonReply,), Error = Infallible> + Clone {
    let with_evaluators = warp::any().map(move || Arc::clone(&evaluators));

    let health = warp::path!("health").map(|| {
        warp::reply::with_status(
            warp::reply::json(&json!({ "status": "ok", "service": "voltforge" })),
            StatusCode::OK,
        )
    });

    let transistor = warp::path!("simulate" / "transistor")
        .and(warp::query::<TransistorQuery>())
        .and(with_evaluators.clone())
        .and_then(|query: TransistorQuery, ev: Arc<Evaluators>| {
            run_blocking("/simulate/transistor", move || ev.transistor(&query))
        });

    let thermal = warp::path!("simulate" / "thermal")
        .and(warp::query::<ThermalQuery>())
        .and(with_evaluators.clone())
        .and_then(|query: ThermalQuery, ev: Arc<Evaluators>| {
            run_blocking("/simulate/thermal", move || ev.thermal(&query))
        });

    let evaluate = warp::path!("search" / "evaluate")
        .and(warp::query::<SearchQuery>())
        .and(with_evaluators.clone())
        .and_then(|query: SearchQuery, ev: Arc<Evaluators>| {
            run_blocking("/search/evaluate", move || ev.evaluate(&query))
        });

    let optimize = warp::path!("search" / "optimize")
        .and(warp::query::<SearchQuery>())
        .and(with_evaluators)
        .and_then(|query: SearchQuery, ev: Arc<Evaluators>| {
            run_blocking("/search/optimize", move || ev.optimize(&query))
        });

    warp::get()
        .and(
            health
                .or(transistor)
                .unify()
                .or(thermal)
                .unify()
                .or(evaluate)
                .unify()
                .or(optimize)
                .unify(),
        )
        .recover(handle_rejection)
        .unify()
}

async fn run_blocking<F>(route: &'static str, job: F) -> Result<JsonReply, Rejection>
where
    F: FnOnce() -> VfResult<Value> + Send + 'static,
{
    let reply = match tokio::task::spawn_blocking(job).await {
        Ok(Ok(body)) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Ok(Err(err)) => {
            warn!(route, error = %err, "request rejected");
            error_reply(status_for(&err), err.to_string())
        }
        Err(join) => {
            warn!(route, error = %join, "evaluation task failed");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, join.to_string())
        }
    };
    info!(route, "handled request");
    Ok(reply)
}

async fn handle_rejection(rejection: Rejection) -> Result<JsonReply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "no such route".to_string())
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, config_error!("{e}").to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "only GET is supported".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled rejection: {rejection:?}"),
        )
    };
    warn!(status = status.as_u16(), %message, "request rejected");
    Ok(error_reply(status, message))
}
