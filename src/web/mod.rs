//! Interactive web form and JSON API over the predictor.
//!
//! The entry table is loaded once at startup. Every prediction request
//! filters it down to one race (optionally one driver) and runs the engine,
//! which re-reads the model artifact each time.

mod pages;

use crate::core::engine::{drivers_for, race_ids, select_rows, PredictionEngine};
use crate::core::{ModelLoader, RaceReport, Record};
use crate::utils::error::{ModelError, PredictorError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct AppState<L: ModelLoader> {
    pub records: Arc<Vec<Record>>,
    pub engine: Arc<PredictionEngine<L>>,
}

impl<L: ModelLoader> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<L: ModelLoader> AppState<L> {
    pub fn new(records: Vec<Record>, engine: PredictionEngine<L>) -> Self {
        Self {
            records: Arc::new(records),
            engine: Arc::new(engine),
        }
    }

    fn predict_blocking(
        &self,
        race: &str,
        driver: Option<&str>,
    ) -> Result<RaceReport, PredictorError> {
        let rows = select_rows(&self.records, race, driver)?;
        let reports = self.engine.run(&rows)?;
        reports
            .get(race)
            .cloned()
            .ok_or_else(|| PredictorError::NotFoundError {
                what: format!("race '{}'", race),
            })
    }
}

impl<L: ModelLoader + 'static> AppState<L> {
    /// Runs the engine on the blocking pool; it reads the model file synchronously.
    async fn predict(
        &self,
        race: String,
        driver: Option<String>,
    ) -> Result<RaceReport, PredictorError> {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.predict_blocking(&race, driver.as_deref()))
            .await
            .map_err(|e| ModelError::PredictionFailed(format!("prediction task aborted: {}", e)))?
    }
}

pub fn router<L>(state: AppState<L>) -> Router
where
    L: ModelLoader + 'static,
{
    Router::new()
        .route("/", get(index::<L>))
        .route("/predict", post(predict_form::<L>))
        .route("/health", get(health::<L>))
        .route("/api/races", get(list_races::<L>))
        .route("/api/races/:race/drivers", get(list_drivers::<L>))
        .route("/api/predict", post(predict_json::<L>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rows: usize,
    pub races: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub race: String,
    #[serde(default)]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    All,
    Driver,
}

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub race: String,
    #[serde(default)]
    pub mode: PredictionMode,
    #[serde(default)]
    pub driver: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub race: Option<String>,
}

/// JSON error body with a status derived from the error kind.
pub struct ApiError(PredictorError);

impl From<PredictorError> for ApiError {
    fn from(err: PredictorError) -> Self {
        Self(err)
    }
}

fn status_for(err: &PredictorError) -> StatusCode {
    match err {
        PredictorError::NotFoundError { .. } => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(err: &PredictorError) -> &'static str {
    match err {
        PredictorError::NotFoundError { .. } => "not_found",
        PredictorError::InvalidRequestError { .. } => "invalid_request",
        PredictorError::SchemaError { .. } | PredictorError::InvalidFieldError { .. } => {
            "schema_error"
        }
        PredictorError::Model(_) => "model_error",
        _ => "internal_error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }
        let body = ErrorResponse {
            error: error_code(&self.0).to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn index<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let races = race_ids(&state.records);
    let selected = query.race.or_else(|| races.first().cloned());
    let drivers = selected
        .as_deref()
        .map(|race| drivers_for(&state.records, race))
        .unwrap_or_default();
    let selection = pages::Selection {
        race: selected.as_deref(),
        ..Default::default()
    };
    Html(pages::form_page(&races, &drivers, selection, None))
}

async fn predict_form<L: ModelLoader + 'static>(
    State(state): State<AppState<L>>,
    Form(form): Form<PredictForm>,
) -> (StatusCode, Html<String>) {
    let races = race_ids(&state.records);
    let drivers = drivers_for(&state.records, &form.race);
    let driver = match form.mode {
        PredictionMode::All => None,
        PredictionMode::Driver => form.driver.clone().filter(|d| !d.is_empty()),
    };

    let outcome = match (form.mode, &driver) {
        (PredictionMode::Driver, None) => Err(PredictorError::InvalidRequestError {
            message: "Specific driver mode needs a driver".to_string(),
        }),
        _ => state.predict(form.race.clone(), driver.clone()).await,
    };
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Prediction for {} failed: {}", form.race, e);
            status_for(e)
        }
    };
    let selection = pages::Selection {
        race: Some(&form.race),
        mode: form.mode,
        driver: driver.as_deref(),
    };
    let page = pages::form_page(&races, &drivers, selection, Some(&outcome));
    (status, Html(page))
}

async fn health<L: ModelLoader>(State(state): State<AppState<L>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rows: state.records.len(),
        races: race_ids(&state.records).len(),
    })
}

async fn list_races<L: ModelLoader>(State(state): State<AppState<L>>) -> Json<Vec<String>> {
    Json(race_ids(&state.records))
}

async fn list_drivers<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path(race): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let drivers = drivers_for(&state.records, &race);
    if drivers.is_empty() {
        return Err(PredictorError::NotFoundError {
            what: format!("race '{}'", race),
        }
        .into());
    }
    Ok(Json(drivers))
}

async fn predict_json<L: ModelLoader + 'static>(
    State(state): State<AppState<L>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<RaceReport>, ApiError> {
    let report = state.predict(req.race, req.driver).await?;
    Ok(Json(report))
}
