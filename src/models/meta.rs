// src/models/meta.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_meta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoMeta {
    // Conta oportunidades
    Quantidade,
    // Soma o valor das oportunidades
    Valor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "periodo_meta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PeriodoMeta {
    Mensal,
    Trimestral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "segmento_meta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SegmentoMeta {
    // Origem e destino no grupo
    Intragrupo,
    // Entrada externa: origem fora do grupo, destino no grupo
    DeFora,
    #[default]
    Tudo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "filtro_status_meta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FiltroStatusMeta {
    #[default]
    Todas,
    Ganhas,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Meta {
    pub id: Uuid,
    #[schema(example = "Indicações do trimestre")]
    pub nome: String,
    pub descricao: Option<String>,
    pub tipo_meta: TipoMeta,
    #[schema(example = 10.0)]
    pub valor_meta: Decimal,
    pub periodo: PeriodoMeta,
    #[schema(example = 2025)]
    pub ano: i32,
    // 1..=12 quando mensal
    pub mes: Option<i32>,
    // 1..=4 quando trimestral
    pub trimestre: Option<i32>,
    pub segmento_grupo: SegmentoMeta,
    pub status_oportunidade: FiltroStatusMeta,
    // Filtra pelo destino da oportunidade
    pub empresa_id: Option<Uuid>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusProgresso {
    Abaixo,
    Dentro,
    Acima,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetaProgresso {
    pub meta: Meta,
    pub realizado: Decimal,
    pub percentual: f64,
    pub status: StatusProgresso,
    // Realizado extrapolado até o fim do período
    pub projecao: Decimal,
    pub probabilidade: f64,
    pub oportunidades_consideradas: usize,
}

// Campos editáveis de uma meta (criação e atualização)
#[derive(Debug, Clone)]
pub struct DadosMeta {
    pub nome: String,
    pub descricao: Option<String>,
    pub tipo_meta: TipoMeta,
    pub valor_meta: Decimal,
    pub periodo: PeriodoMeta,
    pub ano: i32,
    pub mes: Option<i32>,
    pub trimestre: Option<i32>,
    pub segmento_grupo: SegmentoMeta,
    pub status_oportunidade: FiltroStatusMeta,
    pub empresa_id: Option<Uuid>,
    pub ativo: bool,
}
