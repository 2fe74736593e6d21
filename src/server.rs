// HTTP layer.
// Routes valuation and history requests to the engine and serves the dashboard page.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::Config;
use crate::error::CaseworthError;
use crate::market::MarketClient;
use crate::snapshot::{self, HistoryPoint};
use crate::valuation::{Valuation, ValuationEngine};

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Shared per-request state: the engine plus where snapshots go.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ValuationEngine<MarketClient>>,
    snapshot_dir: PathBuf,
}

impl AppState {
    pub fn new(engine: ValuationEngine<MarketClient>, config: &Config) -> Self {
        Self {
            engine: Arc::new(engine),
            snapshot_dir: config.snapshot_dir.clone(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/current-valuation", get(current_valuation))
        .route("/history", get(history))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ValuationQuery {
    persist: Option<String>,
}

impl ValuationQuery {
    fn wants_persist(&self) -> bool {
        matches!(self.persist.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Serialize)]
struct ValuationResponse {
    #[serde(flatten)]
    valuation: Valuation,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    history: Vec<HistoryPoint>,
}

async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Value the inventory; with ?persist=1, also write a snapshot.
///
/// Lookup failures surface as null prices inside a 200 response. Only a
/// cache or snapshot write failure turns into a request failure.
async fn current_valuation(
    State(state): State<AppState>,
    Query(query): Query<ValuationQuery>,
) -> Result<Json<ValuationResponse>, CaseworthError> {
    let valuation = state.engine.compute().await?;

    let mut response = ValuationResponse {
        valuation,
        saved: None,
        filename: None,
    };

    if query.wants_persist() {
        let filename = snapshot::save(&state.snapshot_dir, &response.valuation)?;
        info!("snapshot saved as {filename}");
        response.saved = Some(true);
        response.filename = Some(filename);
    }

    Ok(Json(response))
}

/// The (timestamp, grand total) series derived from all snapshots.
async fn history(
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, CaseworthError> {
    let history = snapshot::list_history(&state.snapshot_dir)?;
    Ok(Json(HistoryResponse { history }))
}

impl IntoResponse for CaseworthError {
    fn into_response(self) -> Response {
        error!("request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
