//! HTTP endpoint handlers. Thin wrappers over the catalog, roster and ledger.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::assessment::code_knowledge::checklist;
use crate::domain::{GameDefinition, NewStudent, Variant};
use crate::error::AppError;
use crate::pages::PageRoute;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.catalog.summary())
}

#[instrument(level = "info", skip(state))]
pub async fn http_game(
  State(state): State<Arc<AppState>>,
  Path((category, game)): Path<(usize, usize)>,
) -> Result<Json<GameDefinition>, AppError> {
  state
    .catalog
    .game(category, game)
    .cloned()
    .map(Json)
    .ok_or_else(|| AppError::NotFound(format!("no game at category {}, index {}", category, game)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_answer_key(
  State(state): State<Arc<AppState>>,
  Query(q): Query<AnswerKeyQuery>,
) -> impl IntoResponse {
  let variant = Variant::from_query(q.variant.as_deref());
  let key = state.catalog.answer_key(q.game.as_deref()).clone();
  info!(target: "phonics_backend", requested = ?q.game, served = %key.slug, %variant, "Answer key served");
  Json(AnswerKeyOut { variant, key, games_url: PageRoute::Games.url() })
}

#[instrument(level = "info")]
pub async fn http_code_checklist(Query(q): Query<VariantQuery>) -> impl IntoResponse {
  let columns = checklist();
  let total = columns.iter().map(|c| c.items.len()).sum();
  Json(CodeChecklistOut { variant: Variant::from_query(q.variant.as_deref()), total, columns })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_students(State(state): State<Arc<AppState>>) -> Json<Vec<StudentOut>> {
  Json(state.roster.list().await.into_iter().map(StudentOut::from).collect())
}

#[instrument(level = "info", skip(state, body), fields(grade = %body.grade))]
pub async fn http_create_student(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NewStudent>,
) -> Result<(StatusCode, Json<StudentOut>), AppError> {
  let student = state.roster.create(body).await?;
  Ok((StatusCode::CREATED, Json(student.into())))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_student(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
) -> Result<Json<StudentOut>, AppError> {
  Ok(Json(state.roster.get(id).await?.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_results(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ResultsQuery>,
) -> impl IntoResponse {
  let records = state.ledger.list(q.variant).await;
  Json(ResultsOut { count: records.len(), records })
}
