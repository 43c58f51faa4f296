// src/handlers/wishlist.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::wishlist::{
        FaseAtualizada, FasePipeline, NovaApresentacao, NovoWishlistItem, StatusWishlist, TipoApresentacao,
        WishlistApresentacao, WishlistItem,
    },
};

fn prioridade_padrao() -> i16 {
    3
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WishlistItemPayload {
    pub empresa_interessada_id: Uuid,
    pub empresa_desejada_id: Uuid,
    pub empresa_proprietaria_id: Uuid,

    #[validate(length(max = 2000))]
    pub motivo: Option<String>,

    #[validate(range(min = 1, max = 5, message = "A prioridade deve estar entre 1 e 5"))]
    #[serde(default = "prioridade_padrao")]
    #[schema(example = 3)]
    pub prioridade: i16,

    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWishlistQuery {
    pub status: Option<StatusWishlist>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApresentacaoPayload {
    pub empresa_facilitadora_id: Uuid,
    // Padrão: hoje
    pub data_apresentacao: Option<NaiveDate>,
    #[serde(default)]
    pub tipo_apresentacao: TipoApresentacao,
    // Padrão: aprovado
    pub fase_pipeline: Option<FasePipeline>,
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FasePayload {
    #[schema(example = "apresentado")]
    pub fase_pipeline: FasePipeline,
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
}

// =============================================================================
//  ÁREA 1: ITENS
// =============================================================================

// POST /api/wishlist
#[utoipa::path(
    post,
    path = "/api/wishlist",
    tag = "Wishlist",
    request_body = WishlistItemPayload,
    responses(
        (status = 201, description = "Pedido de apresentação registrado", body = WishlistItem),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<WishlistItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let novo = NovoWishlistItem {
        empresa_interessada_id: payload.empresa_interessada_id,
        empresa_desejada_id: payload.empresa_desejada_id,
        empresa_proprietaria_id: payload.empresa_proprietaria_id,
        motivo: payload.motivo,
        prioridade: payload.prioridade,
        observacoes: payload.observacoes,
    };
    let item = app_state
        .wishlist_service
        .create_item(&app_state.db_pool, novo)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/wishlist
#[utoipa::path(
    get,
    path = "/api/wishlist",
    tag = "Wishlist",
    params(ListWishlistQuery),
    responses(
        (status = 200, description = "Itens por prioridade", body = Vec<WishlistItem>)
    )
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListWishlistQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .wishlist_service
        .list_items(&app_state.db_pool, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(items)))
}

// GET /api/wishlist/{id}
#[utoipa::path(
    get,
    path = "/api/wishlist/{id}",
    tag = "Wishlist",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item", body = WishlistItem),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .wishlist_service
        .get_item(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(item)))
}

// POST /api/wishlist/{id}/aprovar
#[utoipa::path(
    post,
    path = "/api/wishlist/{id}/aprovar",
    tag = "Wishlist",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item aprovado", body = WishlistItem),
        (status = 422, description = "Item já respondido")
    )
)]
pub async fn aprovar_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .wishlist_service
        .aprovar(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(item)))
}

// POST /api/wishlist/{id}/rejeitar
#[utoipa::path(
    post,
    path = "/api/wishlist/{id}/rejeitar",
    tag = "Wishlist",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item rejeitado", body = WishlistItem),
        (status = 422, description = "Item já respondido")
    )
)]
pub async fn rejeitar_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .wishlist_service
        .rejeitar(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/wishlist/{id}
#[utoipa::path(
    delete,
    path = "/api/wishlist/{id}",
    tag = "Wishlist",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item removido"),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .wishlist_service
        .delete_item(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: APRESENTAÇÕES
// =============================================================================

// POST /api/wishlist/{id}/apresentacoes
#[utoipa::path(
    post,
    path = "/api/wishlist/{id}/apresentacoes",
    tag = "Wishlist",
    request_body = ApresentacaoPayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 201, description = "Apresentação registrada (e oportunidade, se a fase disparar)", body = FaseAtualizada),
        (status = 422, description = "Item rejeitado")
    )
)]
pub async fn create_apresentacao(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApresentacaoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let nova = NovaApresentacao {
        empresa_facilitadora_id: payload.empresa_facilitadora_id,
        data_apresentacao: payload.data_apresentacao.unwrap_or_else(|| Utc::now().date_naive()),
        tipo_apresentacao: payload.tipo_apresentacao,
        fase_pipeline: payload.fase_pipeline.unwrap_or(FasePipeline::Aprovado),
        feedback: payload.feedback,
    };
    let resultado = app_state
        .wishlist_service
        .create_apresentacao(&app_state.db_pool, id, nova)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(resultado)))
}

// GET /api/wishlist/{id}/apresentacoes
#[utoipa::path(
    get,
    path = "/api/wishlist/{id}/apresentacoes",
    tag = "Wishlist",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Apresentações do item", body = Vec<WishlistApresentacao>),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn list_apresentacoes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lista = app_state
        .wishlist_service
        .list_apresentacoes(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(lista)))
}

// PATCH /api/wishlist/apresentacoes/{id}/fase
#[utoipa::path(
    patch,
    path = "/api/wishlist/apresentacoes/{id}/fase",
    tag = "Wishlist",
    request_body = FasePayload,
    params(("id" = Uuid, Path, description = "ID da apresentação")),
    responses(
        (status = 200, description = "Fase atualizada; traz a oportunidade criada automaticamente, se houver", body = FaseAtualizada),
        (status = 404, description = "Apresentação não encontrada")
    )
)]
pub async fn update_fase(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<FasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let resultado = app_state
        .wishlist_service
        .update_fase(&app_state.db_pool, id, payload.fase_pipeline, payload.feedback.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(resultado)))
}
