// src/models/wishlist.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::oportunidade::chave_normalizada;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_wishlist", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusWishlist {
    Pendente,
    Aprovado,
    Rejeitado,
    Convertido,
}

// Fases do pipeline de apresentação:
// aprovado -> planejado -> apresentado -> aguardando_feedback -> convertido | rejeitado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fase_pipeline", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FasePipeline {
    Aprovado,
    Planejado,
    Apresentado,
    AguardandoFeedback,
    Convertido,
    Rejeitado,
}

impl FasePipeline {
    pub const TODAS: [FasePipeline; 6] = [
        FasePipeline::Aprovado,
        FasePipeline::Planejado,
        FasePipeline::Apresentado,
        FasePipeline::AguardandoFeedback,
        FasePipeline::Convertido,
        FasePipeline::Rejeitado,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match chave_normalizada(raw).as_str() {
            "aprovado" => Some(Self::Aprovado),
            "planejado" => Some(Self::Planejado),
            "apresentado" => Some(Self::Apresentado),
            "aguardando_feedback" => Some(Self::AguardandoFeedback),
            "convertido" => Some(Self::Convertido),
            "rejeitado" => Some(Self::Rejeitado),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aprovado => "aprovado",
            Self::Planejado => "planejado",
            Self::Apresentado => "apresentado",
            Self::AguardandoFeedback => "aguardando_feedback",
            Self::Convertido => "convertido",
            Self::Rejeitado => "rejeitado",
        }
    }
}

impl fmt::Display for FasePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "tipo_apresentacao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoApresentacao {
    Email,
    #[default]
    Reuniao,
    Evento,
    Outro,
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    // Quem quer ser apresentado
    pub empresa_interessada_id: Uuid,
    // A quem se quer chegar
    pub empresa_desejada_id: Uuid,
    // Quem tem o relacionamento e faz a ponte
    pub empresa_proprietaria_id: Uuid,
    pub motivo: Option<String>,
    #[schema(example = 3, minimum = 1, maximum = 5)]
    pub prioridade: i16,
    pub status: StatusWishlist,
    pub data_solicitacao: NaiveDate,
    pub data_resposta: Option<NaiveDate>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WishlistApresentacao {
    pub id: Uuid,
    pub wishlist_item_id: Uuid,
    pub empresa_facilitadora_id: Uuid,
    pub data_apresentacao: NaiveDate,
    pub tipo_apresentacao: TipoApresentacao,
    pub fase_pipeline: FasePipeline,
    pub feedback: Option<String>,
    // Preenchido quando a oportunidade é criada a partir desta apresentação
    pub oportunidade_id: Option<Uuid>,
    pub converteu_oportunidade: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resposta da mudança de fase: apresentação confirmada + oportunidade criada (se houve)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FaseAtualizada {
    pub apresentacao: WishlistApresentacao,
    pub oportunidade_criada: Option<crate::models::oportunidade::Oportunidade>,
}

// Dados de entrada já validados pelo handler
#[derive(Debug, Clone)]
pub struct NovoWishlistItem {
    pub empresa_interessada_id: Uuid,
    pub empresa_desejada_id: Uuid,
    pub empresa_proprietaria_id: Uuid,
    pub motivo: Option<String>,
    pub prioridade: i16,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NovaApresentacao {
    pub empresa_facilitadora_id: Uuid,
    pub data_apresentacao: NaiveDate,
    pub tipo_apresentacao: TipoApresentacao,
    pub fase_pipeline: FasePipeline,
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aceita_todas_as_fases() {
        for fase in FasePipeline::TODAS {
            assert_eq!(FasePipeline::parse(fase.as_str()), Some(fase));
        }
        assert_eq!(FasePipeline::parse("Aguardando Feedback"), Some(FasePipeline::AguardandoFeedback));
        assert_eq!(FasePipeline::parse("negociação"), None);
    }
}
