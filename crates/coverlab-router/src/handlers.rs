//! HTTP request handlers for the classroom service.
//!
//! Submissions are validated and computed here, then appended through the
//! shared ledger. The computed result is always returned to the student,
//! even when the ledger is down.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use coverlab_domain::{
    process_submission, summarize, summarize_by_level, ConfidenceLevel, CoverageSummary,
    IntervalError, IntervalResult, LedgerError, LedgerRecord, PopulationParameters,
    ValidationError,
};
use coverlab_store::CachedLedger;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Population every submission is checked against
    pub params: PopulationParameters,
    /// Shared ledger view
    pub ledger: Arc<CachedLedger>,
    /// Whether `GET /parameters` may show μ
    pub reveal_population_mean: bool,
}

impl AppState {
    /// Build state around an existing ledger view
    pub fn new(
        params: PopulationParameters,
        ledger: CachedLedger,
        reveal_population_mean: bool,
    ) -> Self {
        Self {
            params,
            ledger: Arc::new(ledger),
            reveal_population_mean,
        }
    }
}

/// Confidence level as sent by clients: `95` or `"95%"`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LevelField {
    /// Integer percentage
    Percent(u32),
    /// Text such as "95" or "95%"
    Text(String),
}

impl Default for LevelField {
    fn default() -> Self {
        LevelField::Percent(ConfidenceLevel::default().percent())
    }
}

impl LevelField {
    fn resolve(&self) -> Result<ConfidenceLevel, IntervalError> {
        match self {
            LevelField::Percent(p) => ConfidenceLevel::from_percent(*p),
            LevelField::Text(text) => text.parse(),
        }
    }
}

/// Submission request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Student name or sample ID
    pub student_id: String,
    /// Raw values exactly as typed or pasted
    pub values: String,
    /// Confidence level (default: 95)
    #[serde(default)]
    pub confidence_level: LevelField,
}

/// Interval as returned to the submitting student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntervalView {
    /// Level in percent
    pub confidence_level: u32,
    /// x̄
    pub sample_mean: f64,
    /// z · σ/√n
    pub margin_of_error: f64,
    /// x̄ - margin
    pub lower_bound: f64,
    /// x̄ + margin
    pub upper_bound: f64,
    /// Interval contains μ
    pub captures_mean: bool,
}

impl From<&IntervalResult> for IntervalView {
    fn from(r: &IntervalResult) -> Self {
        Self {
            confidence_level: r.confidence_level.percent(),
            sample_mean: r.sample_mean,
            margin_of_error: r.margin_of_error,
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            captures_mean: r.captures_mean,
        }
    }
}

/// Ledger row in its durable column layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordView {
    /// Student identifier
    #[serde(rename = "ID_Estudiante")]
    pub student_id: String,
    /// Level label, e.g. "95%"
    #[serde(rename = "Nivel_Confianza")]
    pub confidence_level: String,
    /// x̄
    #[serde(rename = "Media_Muestral")]
    pub sample_mean: f64,
    /// Margin of error
    #[serde(rename = "Margen_Error")]
    pub margin_of_error: f64,
    /// Lower bound
    #[serde(rename = "LI")]
    pub lower_bound: f64,
    /// Upper bound
    #[serde(rename = "LS")]
    pub upper_bound: f64,
    /// "SÍ" or "NO"
    #[serde(rename = "Captura_Mu")]
    pub captures_mean: String,
}

impl From<&LedgerRecord> for RecordView {
    fn from(r: &LedgerRecord) -> Self {
        Self {
            student_id: r.student_id.clone(),
            confidence_level: r.confidence_level.label().to_string(),
            sample_mean: r.sample_mean,
            margin_of_error: r.margin_of_error,
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            captures_mean: r.capture().as_str().to_string(),
        }
    }
}

/// Submission response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Computed interval
    pub result: IntervalView,
    /// Row appended (or attempted) to the ledger
    pub record: RecordView,
    /// True when the ledger confirmed the append
    pub persisted: bool,
    /// Why the append failed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
}

/// Coverage counts for one group of records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryView {
    /// Records counted
    pub total: usize,
    /// Intervals containing μ
    pub captured_count: usize,
    /// Intervals missing μ
    pub missed_count: usize,
    /// Empirical miss rate in percent
    pub error_rate_percent: f64,
    /// Empirical capture rate in percent
    pub coverage_percent: f64,
    /// Nominal miss rate, when the group has a single level
    #[serde(default)]
    pub expected_error_rate_percent: Option<f64>,
}

impl SummaryView {
    fn new(summary: &CoverageSummary, level: Option<ConfidenceLevel>) -> Self {
        Self {
            total: summary.total,
            captured_count: summary.captured_count,
            missed_count: summary.missed_count,
            error_rate_percent: summary.error_rate_percent,
            coverage_percent: summary.coverage_percent(),
            expected_error_rate_percent: level.map(CoverageSummary::expected_error_rate_percent),
        }
    }
}

/// Class-wide summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Every record
    pub overall: SummaryView,
    /// Keyed by level label ("95%"); levels without records are absent
    pub by_level: BTreeMap<String, SummaryView>,
}

/// Public parameters of the exercise
#[derive(Debug, Serialize, Deserialize)]
pub struct ParametersResponse {
    /// μ, only when revealed by configuration
    pub population_mean: Option<f64>,
    /// σ
    pub population_std_dev: f64,
    /// n
    pub sample_size: usize,
    /// Lowest admissible value
    pub min_allowed_value: f64,
    /// Highest admissible value
    pub max_allowed_value: f64,
    /// σ/√n
    pub standard_error: f64,
    /// Selectable levels in percent
    pub confidence_levels: Vec<u32>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Visible records, when the ledger could be read
    pub records: Option<usize>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable kind
    pub kind: String,
    /// Structured specifics (offending token, counts, values)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Submission rejected by validation
    Validation(ValidationError),
    /// Confidence level not accepted
    Level(IntervalError),
    /// Ledger could not be read
    Ledger(LedgerError),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<IntervalError> for AppError {
    fn from(e: IntervalError) -> Self {
        AppError::Level(e)
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        AppError::Ledger(e)
    }
}

fn validation_detail(e: &ValidationError) -> Option<serde_json::Value> {
    match e {
        ValidationError::EmptyIdentifier | ValidationError::EmptyInput => None,
        ValidationError::ParseError { position, token } => {
            Some(json!({ "position": position, "token": token }))
        }
        ValidationError::WrongCardinality { expected, actual } => {
            Some(json!({ "expected": expected, "actual": actual }))
        }
        ValidationError::OutOfRange { values, min, max } => {
            Some(json!({ "values": values, "min": min, "max": max }))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = match &self {
            AppError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.kind(), validation_detail(e)),
            AppError::Level(e) => {
                let kind = match e {
                    IntervalError::UnsupportedConfidenceLevel(_) => "unsupported_confidence_level",
                    IntervalError::UnrecognizedConfidenceLevel(_) => "unrecognized_confidence_level",
                    IntervalError::InvalidParameters(_) => "invalid_parameters",
                };
                (StatusCode::UNPROCESSABLE_ENTITY, kind, None)
            }
            AppError::Ledger(LedgerError::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ledger_unavailable", None)
            }
            AppError::Ledger(LedgerError::MalformedRecord(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "malformed_record", None)
            }
        };

        let message = match &self {
            AppError::Validation(e) => e.to_string(),
            AppError::Level(e) => e.to_string(),
            AppError::Ledger(e) => e.to_string(),
        };

        let body = Json(ErrorResponse {
            error: message,
            kind: kind.to_string(),
            detail,
        });
        (status, body).into_response()
    }
}

/// POST /submissions - Validate, compute and record one sample
async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let level = request.confidence_level.resolve().map_err(|e| {
        debug!("Rejected level from '{}': {}", request.student_id, e);
        e
    })?;

    let submission = process_submission(&state.params, &request.student_id, &request.values, level)
        .map_err(|e| {
            debug!("Rejected submission from '{}': {}", request.student_id, e);
            e
        })?;

    let (persisted, ledger_error) = match state.ledger.append(submission.record.clone()).await {
        Ok(()) => {
            info!(
                "Recorded {} at {}: [{:.4}, {:.4}] {}",
                submission.record.student_id,
                level,
                submission.record.lower_bound,
                submission.record.upper_bound,
                submission.record.capture()
            );
            (true, None)
        }
        Err(e) => {
            warn!("Could not record {}: {}", submission.record.student_id, e);
            (false, Some(e.to_string()))
        }
    };

    Ok(Json(SubmitResponse {
        result: IntervalView::from(&submission.result),
        record: RecordView::from(&submission.record),
        persisted,
        ledger_error,
    }))
}

/// GET /records - Every record in insertion order
async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<RecordView>>, AppError> {
    let records = state.ledger.read_all().await?;
    Ok(Json(records.iter().map(RecordView::from).collect()))
}

/// GET /summary - Class-wide and per-level coverage
async fn summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, AppError> {
    let records = state.ledger.read_all().await?;
    let by_level = summarize_by_level(&records);

    let single_level = match by_level.keys().collect::<Vec<_>>().as_slice() {
        [only] => Some(**only),
        _ => None,
    };

    Ok(Json(SummaryResponse {
        overall: SummaryView::new(&summarize(&records), single_level),
        by_level: by_level
            .iter()
            .map(|(level, s)| (level.label().to_string(), SummaryView::new(s, Some(*level))))
            .collect(),
    }))
}

/// GET /parameters - σ, n and the admissible range
async fn parameters(State(state): State<AppState>) -> Json<ParametersResponse> {
    let p = &state.params;
    Json(ParametersResponse {
        population_mean: state.reveal_population_mean.then(|| p.population_mean()),
        population_std_dev: p.population_std_dev(),
        sample_size: p.sample_size(),
        min_allowed_value: p.min_allowed_value(),
        max_allowed_value: p.max_allowed_value(),
        standard_error: p.standard_error(),
        confidence_levels: ConfidenceLevel::ALL.iter().map(|l| l.percent()).collect(),
    })
}

/// GET /health - Ledger reachability
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    match state.ledger.read_all().await {
        Ok(records) => Json(HealthCheckResponse {
            status: "healthy".to_string(),
            records: Some(records.len()),
        }),
        Err(e) => {
            warn!("Health check could not read ledger: {}", e);
            Json(HealthCheckResponse {
                status: "degraded".to_string(),
                records: None,
            })
        }
    }
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/submissions", post(submit))
        .route("/records", get(list_records))
        .route("/summary", get(summary))
        .route("/parameters", get(parameters))
        .route("/health", get(health_check))
        .with_state(state)
}
