//! Question answering handlers.

use crate::{
    api::json::ApiJson,
    crag::CragOutput,
    types::{AnswerResponse, QueryInput, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Answer a question through the corrective RAG pipeline.
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QueryInput>,
) -> Result<Json<AnswerResponse>> {
    let answer = state.orchestrator.answer(&payload.question).await?;
    Ok(Json(AnswerResponse { answer }))
}

/// Same as [`generate`], returning the stage path, final question and the
/// passages the answer was generated from.
pub async fn generate_with_trace(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QueryInput>,
) -> Result<Json<CragOutput>> {
    let output = state.orchestrator.run(&payload.question).await?;
    Ok(Json(output))
}
