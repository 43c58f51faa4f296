// src/handlers/metas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::meta::{DadosMeta, FiltroStatusMeta, Meta, MetaProgresso, PeriodoMeta, SegmentoMeta, TipoMeta},
};

fn ativo_padrao() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MetaPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório"))]
    pub nome: String,
    #[validate(length(max = 2000))]
    pub descricao: Option<String>,
    pub tipo_meta: TipoMeta,
    #[schema(example = 10.0)]
    pub valor_meta: Decimal,
    pub periodo: PeriodoMeta,
    #[validate(range(min = 2000, max = 2100))]
    pub ano: i32,
    #[validate(range(min = 1, max = 12))]
    pub mes: Option<i32>,
    #[validate(range(min = 1, max = 4))]
    pub trimestre: Option<i32>,
    #[serde(default)]
    pub segmento_grupo: SegmentoMeta,
    #[serde(default)]
    pub status_oportunidade: FiltroStatusMeta,
    pub empresa_id: Option<Uuid>,
    #[serde(default = "ativo_padrao")]
    pub ativo: bool,
}

impl From<MetaPayload> for DadosMeta {
    fn from(p: MetaPayload) -> Self {
        DadosMeta {
            nome: p.nome,
            descricao: p.descricao,
            tipo_meta: p.tipo_meta,
            valor_meta: p.valor_meta,
            periodo: p.periodo,
            ano: p.ano,
            mes: p.mes,
            trimestre: p.trimestre,
            segmento_grupo: p.segmento_grupo,
            status_oportunidade: p.status_oportunidade,
            empresa_id: p.empresa_id,
            ativo: p.ativo,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMetasQuery {
    #[serde(default)]
    pub apenas_ativas: bool,
}

// POST /api/metas
#[utoipa::path(
    post,
    path = "/api/metas",
    tag = "Metas",
    request_body = MetaPayload,
    responses(
        (status = 201, description = "Meta criada", body = Meta),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_meta(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<MetaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let meta = app_state
        .meta_service
        .create(&app_state.db_pool, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(meta)))
}

// GET /api/metas
#[utoipa::path(
    get,
    path = "/api/metas",
    tag = "Metas",
    params(ListMetasQuery),
    responses(
        (status = 200, description = "Metas", body = Vec<Meta>)
    )
)]
pub async fn list_metas(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListMetasQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let metas = app_state
        .meta_service
        .list(&app_state.db_pool, query.apenas_ativas)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metas)))
}

// GET /api/metas/{id}
#[utoipa::path(
    get,
    path = "/api/metas/{id}",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta", body = Meta),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_meta(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let meta = app_state
        .meta_service
        .get(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(meta)))
}

// PUT /api/metas/{id}
#[utoipa::path(
    put,
    path = "/api/metas/{id}",
    tag = "Metas",
    request_body = MetaPayload,
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta atualizada", body = Meta),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn update_meta(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MetaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let meta = app_state
        .meta_service
        .update(&app_state.db_pool, id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(meta)))
}

// DELETE /api/metas/{id}
#[utoipa::path(
    delete,
    path = "/api/metas/{id}",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 204, description = "Meta removida"),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn delete_meta(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .meta_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/metas/{id}/progresso
#[utoipa::path(
    get,
    path = "/api/metas/{id}/progresso",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Realizado, status e projeção", body = MetaProgresso),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_progresso(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let progresso = app_state
        .meta_service
        .progresso(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(progresso)))
}

// GET /api/metas/progresso
#[utoipa::path(
    get,
    path = "/api/metas/progresso",
    tag = "Metas",
    responses(
        (status = 200, description = "Progresso de todas as metas ativas", body = Vec<MetaProgresso>)
    )
)]
pub async fn list_progresso(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let lista = app_state
        .meta_service
        .progresso_ativas(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(lista)))
}
