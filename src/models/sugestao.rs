// src/models/sugestao.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SugestaoRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub oportunidade_id: Uuid,
}

// Histórico de um parceiro candidato
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidatoParceiro {
    pub empresa_id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub indicacoes: i64,
    pub ganhas: i64,
    pub valor_medio: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SugestaoParceiro {
    pub empresa_id: Uuid,
    pub nome: String,
    // 0..=100
    pub score: f64,
    pub motivos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SugestaoResponse {
    pub oportunidade_id: Uuid,
    pub sugestoes: Vec<SugestaoParceiro>,
    pub usou_ia: bool,
}
