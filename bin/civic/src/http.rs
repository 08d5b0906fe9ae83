use crate::{api, opts::*};

use std::sync::Arc;

use atb_tokio_ext::shutdown_signal;
use civic_core::board::IssueBoard;
use tokio::net::TcpListener;

pub async fn run(
    http_opts: HttpOpts,
    ai_opts: AiOpts,
    report_opts: ReportOpts,
) -> anyhow::Result<()> {
    let completion = ai_opts.completion_service()?;
    let board = Arc::new(IssueBoard::new());
    let app_state = api::state::AppState::new(completion, board, report_opts.quiet_period());

    start_http(http_opts, app_state).await
}

pub async fn start_http(
    http_opts: HttpOpts,
    app_state: api::state::AppState,
) -> anyhow::Result<()> {
    tracing::info!("http listening on {}", http_opts.host);
    let app = api::build_app(&http_opts, app_state)?;
    let listener = TcpListener::bind(&http_opts.host).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
