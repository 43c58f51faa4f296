// src/handlers/suggestions.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    config::AppState,
    models::sugestao::{SugestaoRequest, SugestaoResponse},
};

// Este endpoint é chamado direto pelo front: qualquer falha sai como 500 com corpo fixo
fn falha_generica(causa: &dyn std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!("Falha ao sugerir parceiros: {}", causa);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Não foi possível gerar sugestões de parceiros." })),
    )
}

// POST /api/suggest-partners
#[utoipa::path(
    post,
    path = "/api/suggest-partners",
    tag = "Sugestões",
    request_body = SugestaoRequest,
    responses(
        (status = 200, description = "Até 5 parceiros sugeridos", body = SugestaoResponse),
        (status = 500, description = "Falha genérica")
    )
)]
pub async fn suggest_partners(
    State(app_state): State<AppState>,
    payload: Result<Json<SugestaoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let Json(payload) = payload.map_err(|e| falha_generica(&e))?;

    let resposta = app_state
        .suggestion_service
        .sugerir(&app_state.db_pool, payload.oportunidade_id)
        .await
        .map_err(|e| falha_generica(&e))?;

    Ok((StatusCode::OK, Json(resposta)))
}
