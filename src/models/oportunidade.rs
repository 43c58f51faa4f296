// src/models/oportunidade.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::empresa::TipoEmpresa;

// --- STATUS ---

// Enum fechado. As grafias antigas ("Contato", "Apresentado", "Negociação"...)
// são convertidas em `normalizar` na entrada da API e nunca chegam ao banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_oportunidade", rename_all = "snake_case")]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StatusOportunidade {
    EmContato,
    Negociando,
    Ganho,
    Perdido,
    SemContato,
}

impl StatusOportunidade {
    pub const TODOS: [StatusOportunidade; 5] = [
        StatusOportunidade::EmContato,
        StatusOportunidade::Negociando,
        StatusOportunidade::Ganho,
        StatusOportunidade::Perdido,
        StatusOportunidade::SemContato,
    ];

    /// Converte qualquer grafia conhecida (atual ou legada) para o status canônico.
    pub fn normalizar(raw: &str) -> Option<Self> {
        let chave = chave_normalizada(raw);

        match chave.as_str() {
            "em_contato" | "contato" | "apresentado" | "em_andamento" => Some(Self::EmContato),
            "negociando" | "negociacao" | "em_negociacao" => Some(Self::Negociando),
            "ganho" | "ganha" | "fechado" => Some(Self::Ganho),
            "perdido" | "perdida" => Some(Self::Perdido),
            "sem_contato" => Some(Self::SemContato),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmContato => "em_contato",
            Self::Negociando => "negociando",
            Self::Ganho => "ganho",
            Self::Perdido => "perdido",
            Self::SemContato => "sem_contato",
        }
    }

    /// Ainda não chegou a um desfecho (ganho/perdido)
    pub fn em_andamento(self) -> bool {
        !matches!(self, Self::Ganho | Self::Perdido)
    }
}

impl fmt::Display for StatusOportunidade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusOportunidade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalizar(s).ok_or_else(|| format!("status de oportunidade desconhecido: '{}'", s))
    }
}

impl TryFrom<String> for StatusOportunidade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// minúsculas, sem acento, espaços e hífens viram '_'
pub(crate) fn chave_normalizada(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Oportunidade {
    pub id: Uuid,
    pub empresa_origem_id: Uuid,
    pub empresa_destino_id: Uuid,
    pub status: StatusOportunidade,
    #[schema(example = 15000.0)]
    pub valor: Option<Decimal>,
    pub data_indicacao: NaiveDate,
    pub data_fechamento: Option<NaiveDate>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Oportunidade + nome/tipo das duas pontas (JOIN com empresas).
// É a entrada de todos os cálculos de dashboard.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OportunidadeDetalhada {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub oportunidade: Oportunidade,
    pub origem_nome: String,
    pub origem_tipo: TipoEmpresa,
    pub destino_nome: String,
    pub destino_tipo: TipoEmpresa,
}

impl OportunidadeDetalhada {
    pub fn status(&self) -> StatusOportunidade {
        self.oportunidade.status
    }

    pub fn valor(&self) -> Decimal {
        self.oportunidade.valor.unwrap_or(Decimal::ZERO)
    }

    pub fn data_indicacao(&self) -> NaiveDate {
        self.oportunidade.data_indicacao
    }
}

// Dados para criar/atualizar (já normalizados)
#[derive(Debug, Clone)]
pub struct NovaOportunidade {
    pub empresa_origem_id: Uuid,
    pub empresa_destino_id: Uuid,
    pub status: StatusOportunidade,
    pub valor: Option<Decimal>,
    pub data_indicacao: NaiveDate,
    pub data_fechamento: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normaliza_grafias_legadas() {
        assert_eq!(StatusOportunidade::normalizar("Apresentado"), Some(StatusOportunidade::EmContato));
        assert_eq!(StatusOportunidade::normalizar("Contato"), Some(StatusOportunidade::EmContato));
        assert_eq!(StatusOportunidade::normalizar("em_contato"), Some(StatusOportunidade::EmContato));
        assert_eq!(StatusOportunidade::normalizar("Negociação"), Some(StatusOportunidade::Negociando));
        assert_eq!(StatusOportunidade::normalizar(" Ganho "), Some(StatusOportunidade::Ganho));
        assert_eq!(StatusOportunidade::normalizar("Sem contato"), Some(StatusOportunidade::SemContato));
        assert_eq!(StatusOportunidade::normalizar("perdido"), Some(StatusOportunidade::Perdido));
    }

    #[test]
    fn grafia_desconhecida_e_erro() {
        assert_eq!(StatusOportunidade::normalizar("talvez"), None);
        assert!("".parse::<StatusOportunidade>().is_err());
    }

    #[test]
    fn deserializa_legado_e_serializa_canonico() {
        let status: StatusOportunidade = serde_json::from_str("\"Apresentado\"").unwrap();
        assert_eq!(status, StatusOportunidade::EmContato);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"em_contato\"");

        let invalido = serde_json::from_str::<StatusOportunidade>("\"xyz\"");
        assert!(invalido.is_err());
    }

    #[test]
    fn todos_os_canonicos_voltam_para_si_mesmos() {
        for status in StatusOportunidade::TODOS {
            assert_eq!(StatusOportunidade::normalizar(status.as_str()), Some(status));
        }
    }
}
