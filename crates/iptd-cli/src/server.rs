use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use iptd_core::{DiffError, Snapshot, diff, parse, to_json};
use tokio::sync::RwLock;

use crate::dump;
use crate::metrics::ServerMetrics;

/// Shared server state. The baseline snapshot is immutable once stored;
/// replacing it swaps the whole value under the write lock, so concurrent
/// readers always see a complete snapshot.
struct AppState {
    baseline: RwLock<Option<Snapshot>>,
    metrics: ServerMetrics,
}

pub async fn serve(listen_addr: &str) -> Result<()> {
    let state = Arc::new(AppState {
        baseline: RwLock::new(None),
        metrics: ServerMetrics::new()?,
    });

    let app = Router::new()
        .route("/iptables", get(get_snapshot))
        .route("/iptables/diff", get(get_diff))
        .route("/iptables/baseline", post(reset_baseline))
        .route("/metrics", get(get_metrics))
        .with_state(state);

    let addr: std::net::SocketAddr = listen_addr.parse()?;
    tracing::info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /iptables - the current ruleset as a full snapshot
async fn get_snapshot(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("/iptables");

    match current_snapshot(&state).await {
        Ok(snapshot) => json_response(&snapshot),
        Err(err) => internal_error(err),
    }
}

/// GET /iptables/diff - counter movement since the stored baseline. The
/// first call captures the baseline and reports an empty diff.
async fn get_diff(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("/iptables/diff");

    let current = match current_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(err) => return internal_error(err),
    };

    let mut baseline = state.baseline.write().await;
    let Some(older) = baseline.as_ref() else {
        *baseline = Some(current);
        return json_response(&Snapshot::new());
    };

    match diff(older, &current) {
        Ok(delta) => json_response(&delta),
        Err(err @ DiffError::CounterRegression { .. }) => {
            state.metrics.record_counter_regression();
            tracing::warn!("{err}");
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
    }
}

/// POST /iptables/baseline - recapture the diff baseline
async fn reset_baseline(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("/iptables/baseline");

    match current_snapshot(&state).await {
        Ok(snapshot) => {
            *state.baseline.write().await = Some(snapshot);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// GET /metrics - Prometheus text exposition
async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("/metrics");

    match state.metrics.render() {
        Ok(body) => body.into_response(),
        Err(err) => internal_error(err),
    }
}

async fn current_snapshot(state: &AppState) -> Result<Snapshot> {
    let text = dump::collect().await?;
    let snapshot = parse(&text).map_err(|err| {
        state.metrics.record_parse_failure();
        anyhow::Error::new(err)
    })?;

    state.metrics.observe_snapshot(&snapshot);
    Ok(snapshot)
}

fn json_response(snapshot: &Snapshot) -> Response {
    match to_json(snapshot) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => internal_error(err.into()),
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("{err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}
