// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Erros de domínio. Os services só conhecem este tipo;
// a conversão para HTTP (e o idioma da mensagem) acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Regra de negócio violada: {0}")]
    BusinessRule(String),

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Falha em serviço externo: {0}")]
    ExternalService(String),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte erro de violação de chave única em um erro mais amigável
    pub fn from_unique(e: sqlx::Error, mensagem: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(mensagem.into());
            }
        }
        e.into()
    }

    /// FK quebrada (empresa inexistente etc.) vira erro de entrada, não 500
    pub fn from_foreign_key(e: sqlx::Error, mensagem: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::InvalidInput(mensagem.into());
            }
        }
        e.into()
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Monta a resposta HTTP no idioma do cliente (pt ou en).
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let status = self.status();

        let message = match self {
            AppError::ValidationError(_) => {
                if en { "One or more fields are invalid.".to_string() } else { "Um ou mais campos são inválidos.".to_string() }
            }
            AppError::InvalidInput(detalhe) => {
                if en { format!("Invalid input: {}", detalhe) } else { format!("Entrada inválida: {}", detalhe) }
            }
            AppError::NotFound(entidade) => {
                if en { format!("{} not found.", entidade) } else { format!("{} não encontrado(a).", entidade) }
            }
            AppError::BusinessRule(detalhe) | AppError::UniqueConstraintViolation(detalhe) => detalhe.clone(),
            AppError::ExternalService(_) => {
                if en { "An external service failed.".to_string() } else { "Um serviço externo falhou.".to_string() }
            }
            // DatabaseError e InternalServerError viram 500 com mensagem genérica.
            // O detalhe vai só para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                if en { "An unexpected error occurred.".to_string() } else { "Ocorreu um erro inesperado.".to_string() }
            }
        };

        let details = match self {
            AppError::ValidationError(errors) => Some(detalhes_validacao(errors)),
            _ => None,
        };

        ApiError { status, message, details }
    }
}

// campo -> lista de códigos/mensagens
fn detalhes_validacao(errors: &validator::ValidationErrors) -> Value {
    let mut details: HashMap<String, Vec<String>> = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}

// O erro já pronto para sair pela API
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn not_found_vira_404_localizado() {
        let err = AppError::NotFound("Empresa");
        let api = err.to_api_error(&pt());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "Empresa não encontrado(a).");

        let api_en = err.to_api_error(&Locale("en".to_string()));
        assert_eq!(api_en.message, "Empresa not found.");
    }

    #[test]
    fn erro_interno_nao_vaza_detalhe() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123"));
        let api = err.to_api_error(&pt());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("123"));
    }

    #[test]
    fn validacao_traz_detalhes_por_campo() {
        let mut errors = validator::ValidationErrors::new();
        let mut e = validator::ValidationError::new("range");
        e.message = Some("prioridade_invalida".into());
        errors.add("prioridade", e);

        let api = AppError::ValidationError(errors).to_api_error(&pt());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalhes");
        assert_eq!(details["prioridade"][0], "prioridade_invalida");
    }

    #[test]
    fn regra_de_negocio_e_422() {
        let api = AppError::BusinessRule("Um cliente não pode ser dono de outro cliente.".into())
            .to_api_error(&pt());
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
