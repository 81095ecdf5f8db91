//! Interactive front-end: a small JSON API over the advisor.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use advisor_core::advisor::{AdviceRequest, Advisor};
use advisor_core::domain::recommendation::AdviceReport;
use advisor_core::error::AdvisorError;
use advisor_core::time::DateRange;

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    pub tickers: Arc<Vec<String>>,
    pub default_days: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/tickers", get(list_tickers))
        .route("/advice/:ticker", get(get_advice))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct TickerList {
    tickers: Vec<String>,
    default_days: u32,
}

async fn list_tickers(State(state): State<AppState>) -> Json<TickerList> {
    Json(TickerList {
        tickers: state.tickers.as_ref().clone(),
        default_days: state.default_days,
    })
}

#[derive(Debug, Deserialize)]
struct AdviceQuery {
    days: Option<u32>,
}

async fn get_advice(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AdviceQuery>,
) -> Result<Json<AdviceReport>, ApiError> {
    let days = query.days.unwrap_or(state.default_days);
    let today = chrono::Utc::now().date_naive();
    let range = DateRange::lookback(today, days)?;
    let req = AdviceRequest::new(&ticker, range)?;

    let report = state.advisor.advise(&req).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

struct ApiError(AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        Self(err)
    }
}

fn status_for(err: &AdvisorError) -> StatusCode {
    match err {
        AdvisorError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AdvisorError::EmptySeries { .. } => StatusCode::NOT_FOUND,
        AdvisorError::MalformedSeries { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisorError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        // advise() folds this into the outcome; only reachable from other callers.
        AdvisorError::SentimentUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(self.0.clone()));
            tracing::error!(error = %self.0, kind = self.0.kind(), "advice request failed");
        } else {
            tracing::warn!(error = %self.0, kind = self.0.kind(), "advice request rejected");
        }

        let body = ErrorBody {
            kind: self.0.kind(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
