// src/handlers/oportunidades.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::oportunidade::{NovaOportunidade, Oportunidade, OportunidadeDetalhada, StatusOportunidade},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OportunidadePayload {
    pub empresa_origem_id: Uuid,
    pub empresa_destino_id: Uuid,

    // Aceita as grafias antigas ("Contato", "Negociação"...). Padrão: em_contato
    #[schema(example = "em_contato")]
    pub status: Option<String>,

    #[schema(example = 15000.0)]
    pub valor: Option<Decimal>,

    // Padrão: hoje
    pub data_indicacao: Option<NaiveDate>,
    pub data_fechamento: Option<NaiveDate>,

    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusPayload {
    #[schema(example = "ganho")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOportunidadesQuery {
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Normaliza o status na entrada. Grafia desconhecida é erro de validação no campo `status`.
pub(crate) fn parse_status(raw: &str) -> Result<StatusOportunidade, AppError> {
    StatusOportunidade::normalizar(raw).ok_or_else(|| {
        let mut erro = ValidationError::new("status_desconhecido");
        erro.message = Some(format!("status desconhecido: '{}'", raw).into());
        let mut errors = ValidationErrors::new();
        errors.add("status", erro);
        AppError::ValidationError(errors)
    })
}

impl OportunidadePayload {
    fn into_nova(self) -> Result<NovaOportunidade, AppError> {
        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => StatusOportunidade::EmContato,
        };
        Ok(NovaOportunidade {
            empresa_origem_id: self.empresa_origem_id,
            empresa_destino_id: self.empresa_destino_id,
            status,
            valor: self.valor,
            data_indicacao: self.data_indicacao.unwrap_or_else(|| Utc::now().date_naive()),
            data_fechamento: self.data_fechamento,
            observacoes: self.observacoes,
        })
    }
}

// POST /api/oportunidades
#[utoipa::path(
    post,
    path = "/api/oportunidades",
    tag = "Oportunidades",
    request_body = OportunidadePayload,
    responses(
        (status = 201, description = "Oportunidade criada", body = Oportunidade),
        (status = 400, description = "Dados inválidos ou status desconhecido"),
        (status = 422, description = "Origem igual ao destino")
    )
)]
pub async fn create_oportunidade(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<OportunidadePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let nova = payload.into_nova().map_err(|e| e.to_api_error(&locale))?;

    let oportunidade = app_state
        .oportunidade_service
        .create(&app_state.db_pool, nova)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(oportunidade)))
}

// GET /api/oportunidades
#[utoipa::path(
    get,
    path = "/api/oportunidades",
    tag = "Oportunidades",
    params(ListOportunidadesQuery),
    responses(
        (status = 200, description = "Oportunidades com as empresas de cada ponta", body = Vec<OportunidadeDetalhada>)
    )
)]
pub async fn list_oportunidades(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListOportunidadesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(parse_status)
        .transpose()
        .map_err(|e| e.to_api_error(&locale))?;

    let oportunidades = app_state
        .oportunidade_service
        .list(&app_state.db_pool, query.inicio, query.fim, status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(oportunidades)))
}

// GET /api/oportunidades/{id}
#[utoipa::path(
    get,
    path = "/api/oportunidades/{id}",
    tag = "Oportunidades",
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Oportunidade", body = Oportunidade),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_oportunidade(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let oportunidade = app_state
        .oportunidade_service
        .get(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(oportunidade)))
}

// PUT /api/oportunidades/{id}
#[utoipa::path(
    put,
    path = "/api/oportunidades/{id}",
    tag = "Oportunidades",
    request_body = OportunidadePayload,
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Oportunidade atualizada; apresentações vinculadas acompanham o status", body = Oportunidade),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn update_oportunidade(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<OportunidadePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let dados = payload.into_nova().map_err(|e| e.to_api_error(&locale))?;

    let oportunidade = app_state
        .oportunidade_service
        .update(&app_state.db_pool, id, dados)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(oportunidade)))
}

// PATCH /api/oportunidades/{id}/status
#[utoipa::path(
    patch,
    path = "/api/oportunidades/{id}/status",
    tag = "Oportunidades",
    request_body = StatusPayload,
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Status atualizado", body = Oportunidade),
        (status = 400, description = "Status desconhecido"),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = parse_status(&payload.status).map_err(|e| e.to_api_error(&locale))?;

    let oportunidade = app_state
        .oportunidade_service
        .update_status(&app_state.db_pool, id, status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(oportunidade)))
}

// DELETE /api/oportunidades/{id}
#[utoipa::path(
    delete,
    path = "/api/oportunidades/{id}",
    tag = "Oportunidades",
    params(("id" = Uuid, Path, description = "ID da oportunidade")),
    responses(
        (status = 204, description = "Oportunidade removida"),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn delete_oportunidade(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .oportunidade_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_legado_e_aceito() {
        assert_eq!(parse_status("Negociação").unwrap(), StatusOportunidade::Negociando);
    }

    #[test]
    fn status_desconhecido_aponta_o_campo() {
        let err = parse_status("quase ganho").unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("esperava erro de validação");
        };
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn payload_sem_status_comeca_em_contato() {
        let payload: OportunidadePayload = serde_json::from_value(serde_json::json!({
            "empresa_origem_id": Uuid::new_v4(),
            "empresa_destino_id": Uuid::new_v4(),
            "data_indicacao": "2025-03-01"
        }))
        .unwrap();
        let nova = payload.into_nova().unwrap();
        assert_eq!(nova.status, StatusOportunidade::EmContato);
        assert_eq!(nova.data_indicacao, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
