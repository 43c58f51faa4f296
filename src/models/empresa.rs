// src/models/empresa.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE tipo_empresa do banco.
// O tipo particiona as empresas: grupo interno, parceiro externo e cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_empresa", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoEmpresa {
    Intragrupo,
    Parceiro,
    Cliente,
}

impl TipoEmpresa {
    /// Só empresas do grupo ou parceiros podem ser donas de clientes.
    pub fn pode_ter_clientes(self) -> bool {
        !matches!(self, TipoEmpresa::Cliente)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "status_empresa", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusEmpresa {
    #[default]
    Ativo,
    Inativo,
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Empresa {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Acme Consultoria")]
    pub nome: String,
    pub tipo: TipoEmpresa,
    pub status: StatusEmpresa,
    pub descricao: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Vínculo "empresa dona" -> "cliente"
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmpresaCliente {
    pub id: Uuid,
    pub empresa_proprietaria_id: Uuid,
    pub empresa_cliente_id: Uuid,
    pub data_relacionamento: NaiveDate,
}

// Cliente + data do vínculo, usado na listagem de clientes de uma empresa
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClienteVinculado {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub empresa: Empresa,
    pub data_relacionamento: NaiveDate,
}

// --- BULK ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultadoBulk {
    Criado,
    Vinculado,
    Duplicado,
    Erro,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemBulkResultado {
    pub nome: String,
    pub resultado: ResultadoBulk,
    pub empresa_id: Option<Uuid>,
    pub mensagem: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct BulkClientesResumo {
    pub resultados: Vec<ItemBulkResultado>,
    pub total_criados: usize,
    pub total_vinculados: usize,
    pub total_duplicados: usize,
    pub total_erros: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BulkProgresso {
    pub processados: usize,
    pub total: usize,
    pub percentual: f64,
}
