// src/handlers/empresas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::empresa::{BulkClientesResumo, ClienteVinculado, Empresa, EmpresaCliente, StatusEmpresa, TipoEmpresa},
};

// =============================================================================
//  ÁREA 1: EMPRESAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmpresaPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório (até 200 caracteres)"))]
    #[schema(example = "Acme Consultoria")]
    pub nome: String,

    #[schema(example = "parceiro")]
    pub tipo: TipoEmpresa,

    #[serde(default)]
    pub status: StatusEmpresa,

    #[validate(length(max = 2000))]
    pub descricao: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEmpresasQuery {
    pub tipo: Option<TipoEmpresa>,
}

// POST /api/empresas
#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Empresas",
    request_body = EmpresaPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Empresa),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_empresa(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<EmpresaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let empresa = app_state
        .empresa_service
        .create_empresa(
            &app_state.db_pool,
            &payload.nome,
            payload.tipo,
            payload.status,
            payload.descricao.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(empresa)))
}

// GET /api/empresas
#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Empresas",
    params(ListEmpresasQuery),
    responses(
        (status = 200, description = "Empresas em ordem alfabética", body = Vec<Empresa>)
    )
)]
pub async fn list_empresas(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListEmpresasQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let empresas = app_state
        .empresa_service
        .list_empresas(&app_state.db_pool, query.tipo)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(empresas)))
}

// GET /api/empresas/{id}
#[utoipa::path(
    get,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = Empresa),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn get_empresa(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let empresa = app_state
        .empresa_service
        .get_empresa(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(empresa)))
}

// PUT /api/empresas/{id}
#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    request_body = EmpresaPayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa atualizada", body = Empresa),
        (status = 404, description = "Empresa não encontrada"),
        (status = 422, description = "Troca de tipo incompatível com os vínculos de clientes")
    )
)]
pub async fn update_empresa(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmpresaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let empresa = app_state
        .empresa_service
        .update_empresa(
            &app_state.db_pool,
            id,
            &payload.nome,
            payload.tipo,
            payload.status,
            payload.descricao.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(empresa)))
}

// DELETE /api/empresas/{id}
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn delete_empresa(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .empresa_service
        .delete_empresa(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: CLIENTES DE UMA EMPRESA
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct VincularClientePayload {
    pub empresa_cliente_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkClientesPayload {
    #[validate(length(min = 1, max = 500, message = "Informe de 1 a 500 nomes"))]
    #[schema(example = json!(["Cliente A", "Cliente B"]))]
    pub nomes: Vec<String>,
}

// POST /api/empresas/{id}/clientes
#[utoipa::path(
    post,
    path = "/api/empresas/{id}/clientes",
    tag = "Empresas",
    request_body = VincularClientePayload,
    params(("id" = Uuid, Path, description = "ID da empresa dona")),
    responses(
        (status = 201, description = "Cliente vinculado", body = EmpresaCliente),
        (status = 409, description = "Cliente já vinculado"),
        (status = 422, description = "Vínculo viola a regra de tipos")
    )
)]
pub async fn vincular_cliente(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<VincularClientePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let vinculo = app_state
        .empresa_service
        .vincular_cliente(&app_state.db_pool, id, payload.empresa_cliente_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(vinculo)))
}

// GET /api/empresas/{id}/clientes
#[utoipa::path(
    get,
    path = "/api/empresas/{id}/clientes",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa dona")),
    responses(
        (status = 200, description = "Clientes vinculados", body = Vec<ClienteVinculado>),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn list_clientes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let clientes = app_state
        .empresa_service
        .list_clientes(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clientes)))
}

// DELETE /api/empresas/{id}/clientes/{cliente_id}
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}/clientes/{cliente_id}",
    tag = "Empresas",
    params(
        ("id" = Uuid, Path, description = "ID da empresa dona"),
        ("cliente_id" = Uuid, Path, description = "ID do cliente")
    ),
    responses(
        (status = 204, description = "Vínculo removido"),
        (status = 404, description = "Vínculo não encontrado")
    )
)]
pub async fn desvincular_cliente(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, cliente_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .empresa_service
        .desvincular_cliente(&app_state.db_pool, id, cliente_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/empresas/{id}/clientes/bulk
#[utoipa::path(
    post,
    path = "/api/empresas/{id}/clientes/bulk",
    tag = "Empresas",
    request_body = BulkClientesPayload,
    params(("id" = Uuid, Path, description = "ID da empresa dona")),
    responses(
        (status = 200, description = "Resultado por nome", body = BulkClientesResumo),
        (status = 404, description = "Empresa não encontrada"),
        (status = 422, description = "Empresa dona é um cliente")
    )
)]
pub async fn bulk_clientes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<BulkClientesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let resumo = app_state
        .bulk_cliente_service
        .processar_clientes(id, &payload.nomes, |p| {
            tracing::debug!("Lote {}: {}/{} ({:.0}%)", id, p.processados, p.total, p.percentual);
        })
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(resumo)))
}
