// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::{
        FiltroPeriodo, PainelParceiros, RecebimentoEmpresa, RelevanciaParceiro, ResultadosStats, SemanaTendencia,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TendenciaQuery {
    // 1..=52, padrão 8
    pub semanas: Option<usize>,
}

// GET /api/dashboard/resultados
#[utoipa::path(
    get,
    path = "/api/dashboard/resultados",
    tag = "Dashboard",
    params(FiltroPeriodo),
    responses(
        (status = 200, description = "Totais, conversão e ticket médio", body = ResultadosStats)
    )
)]
pub async fn get_resultados(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroPeriodo>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .resultados(&app_state.db_pool, filtro)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/dashboard/parceiros
#[utoipa::path(
    get,
    path = "/api/dashboard/parceiros",
    tag = "Dashboard",
    params(FiltroPeriodo),
    responses(
        (status = 200, description = "Ranking de parceiros e matriz origem x destino", body = PainelParceiros)
    )
)]
pub async fn get_parceiros(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroPeriodo>,
) -> Result<impl IntoResponse, ApiError> {
    let painel = app_state
        .dashboard_service
        .parceiros(&app_state.db_pool, filtro)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(painel)))
}

// GET /api/dashboard/recebimento
#[utoipa::path(
    get,
    path = "/api/dashboard/recebimento",
    tag = "Dashboard",
    params(FiltroPeriodo),
    responses(
        (status = 200, description = "Oportunidades recebidas por empresa do grupo", body = Vec<RecebimentoEmpresa>)
    )
)]
pub async fn get_recebimento(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroPeriodo>,
) -> Result<impl IntoResponse, ApiError> {
    let lista = app_state
        .dashboard_service
        .recebimento(&app_state.db_pool, filtro)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(lista)))
}

// GET /api/dashboard/tendencia
#[utoipa::path(
    get,
    path = "/api/dashboard/tendencia",
    tag = "Dashboard",
    params(TendenciaQuery),
    responses(
        (status = 200, description = "Indicações e ganhos por semana", body = Vec<SemanaTendencia>),
        (status = 400, description = "Quantidade de semanas fora da faixa")
    )
)]
pub async fn get_tendencia(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<TendenciaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let semanas = app_state
        .dashboard_service
        .tendencia(&app_state.db_pool, query.semanas.unwrap_or(8))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(semanas)))
}

// GET /api/dashboard/relevancia
#[utoipa::path(
    get,
    path = "/api/dashboard/relevancia",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Parceiros ordenados pelo score de relevância", body = Vec<RelevanciaParceiro>)
    )
)]
pub async fn get_relevancia(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let ranking = app_state
        .dashboard_service
        .relevancia(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(ranking)))
}
