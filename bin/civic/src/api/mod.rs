pub mod admin;
pub mod ai;
pub mod errors;
pub mod issues;
pub mod report;
pub mod state;

use crate::opts::HttpOpts;

use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, Request, StatusCode, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_app(opts: &HttpOpts, state: state::AppState) -> anyhow::Result<Router> {
    let allowed_origins = opts
        .origins
        .iter()
        .map(|v| {
            v.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {v}"))
        })
        .collect::<anyhow::Result<Vec<HeaderValue>>>()?;

    Ok(Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .merge(ai::routes())
        .merge(issues::routes())
        .merge(admin::routes())
        .merge(report::routes())
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
                .max_age(Duration::from_secs(3600)),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state))
}
