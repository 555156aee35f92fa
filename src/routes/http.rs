//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument};

use crate::error::DivinationError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

/// Engine error on its way out as a JSON body.
pub struct ApiError(pub DivinationError);

impl From<DivinationError> for ApiError {
  fn from(e: DivinationError) -> Self {
    ApiError(e)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = match &self.0 {
      DivinationError::InvalidSeedInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
      DivinationError::UnknownMethod { .. } => (StatusCode::BAD_REQUEST, "unknown_method"),
      DivinationError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
      DivinationError::Storage { .. } | DivinationError::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
      _ => (StatusCode::BAD_GATEWAY, "upstream"),
    };
    if status.is_server_error() {
      error!(target: "divination", error = %self.0, "Request failed");
    }
    (status, Json(ErrorOut { error: kind, message: self.0.to_string() })).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    completion_enabled: state.completion.is_some(),
    methods: state.registry.iter().count(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_methods(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.registry.iter().map(to_method_out).collect::<Vec<_>>())
}

#[instrument(level = "info", skip(state, body), fields(method = %body.method, inputs = body.inputs.len()))]
pub async fn http_post_divination(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DivineIn>,
) -> Result<(StatusCode, Json<crate::domain::DivinationResult>), ApiError> {
  let result = divine(&state, &body.method, body.inputs).await?;
  info!(target: "divination", id = %result.id, method = %result.method_id, sections = result.sections.len(), "HTTP reading served");
  Ok((StatusCode::CREATED, Json(result)))
}

#[instrument(level = "info", skip(state, body), fields(method = %body.method))]
pub async fn http_post_prompt(State(state): State<Arc<AppState>>, Json(body): Json<DivineIn>) -> ApiResult<PromptOut> {
  let prompt = prompt_for(&state, &body.method, &body.inputs)?;
  Ok(Json(PromptOut { prompt }))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_parse(State(state): State<Arc<AppState>>, Json(body): Json<ParseIn>) -> ApiResult<ParseOut> {
  Ok(Json(parse_text(&state, &body.text, body.method.as_deref())?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_almanac(
  State(state): State<Arc<AppState>>,
  Query(q): Query<AlmanacQuery>,
) -> ApiResult<crate::generators::almanac::AlmanacDay> {
  Ok(Json(almanac_for(q.date.as_deref(), state.today())?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_results(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ResultSummaryOut>> {
  Ok(Json(list_results(&state).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_result(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ResultOut> {
  Ok(Json(load_result(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_result(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
  delete_result(&state, &id).await?;
  info!(target: "divination", %id, "HTTP result deleted");
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(sections = body.sections.len()))]
pub async fn http_put_sections(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ReplaceSectionsIn>,
) -> ApiResult<crate::domain::DivinationResult> {
  Ok(Json(replace_sections(&state, &id, body.sections).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_share(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ShareOut> {
  let text = share_text(&state, &id).await?;
  Ok(Json(ShareOut { text }))
}

#[instrument(level = "info")]
pub async fn http_get_mbti_questions() -> impl IntoResponse {
  Json(QuestionBankOut {
    version: crate::mbti::BANK_VERSION,
    answer_min: crate::mbti::ANSWER_MIN,
    answer_max: crate::mbti::ANSWER_MAX,
    questions: &crate::mbti::QUESTIONS,
  })
}
