// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::empresa::TipoEmpresa;
use crate::models::oportunidade::StatusOportunidade;

// 1. Resultados (cards do topo)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultadosStats {
    pub total: usize,
    pub ganhas: usize,
    pub perdidas: usize,
    pub em_andamento: usize,
    // ganhas / total * 100
    pub taxa_conversao: f64,
    pub valor_total: Decimal,
    pub valor_ganho: Decimal,
    pub ticket_medio: Decimal,
    pub por_status: Vec<ContagemStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContagemStatus {
    pub status: StatusOportunidade,
    pub quantidade: usize,
}

// 2. Ranking de parceiros
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParceiroStats {
    pub posicao: usize,
    pub empresa_id: Uuid,
    pub nome: String,
    pub indicacoes_enviadas: usize,
    pub indicacoes_recebidas: usize,
    pub ganhas: usize,
    pub valor_gerado: Decimal,
    pub taxa_conversao: f64,
    // enviadas - recebidas
    pub saldo: i64,
}

// Célula da matriz origem x destino
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CelulaMatriz {
    pub origem_id: Uuid,
    pub origem_nome: String,
    pub destino_id: Uuid,
    pub destino_nome: String,
    pub quantidade: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PainelParceiros {
    pub ranking: Vec<ParceiroStats>,
    pub matriz: Vec<CelulaMatriz>,
}

// 3. Recebimento (oportunidades que chegaram ao grupo)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecebimentoEmpresa {
    pub empresa_id: Uuid,
    pub nome: String,
    pub recebidas: usize,
    pub de_parceiros: usize,
    pub de_intragrupo: usize,
    pub ganhas: usize,
    pub taxa_conversao: f64,
    pub valor_ganho: Decimal,
}

// 4. Tendência semanal
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SemanaTendencia {
    // Segunda-feira da semana
    pub inicio_semana: NaiveDate,
    pub total: usize,
    pub ganhas: usize,
}

// 5. Relevância de parceiros
// Sinais já agregados por parceiro (o service monta a partir do banco)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SinaisParceiro {
    pub empresa_id: Uuid,
    pub nome: String,
    pub total_clientes: usize,
    // Clientes do parceiro que aparecem como desejados na wishlist
    pub clientes_desejados: usize,
    // Vínculos criados nos últimos 30 dias
    pub clientes_novos: usize,
    pub apresentacoes: usize,
    pub oportunidades: usize,
    pub oportunidades_ganhas: usize,
    pub wishlist_total: usize,
    pub wishlist_aprovados: usize,
    pub ultima_interacao: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RelevanciaParceiro {
    pub empresa_id: Uuid,
    pub nome: String,
    pub score: f64,
    pub cobertura: f64,
    pub taxa_conversao: f64,
    pub taxa_aprovacao: f64,
    pub versao_politica: String,
}

// Filtro comum: intervalo de datas e par de tipos (origem -> destino)
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct FiltroPeriodo {
    pub inicio: Option<NaiveDate>,
    pub fim: Option<NaiveDate>,
    pub tipo_origem: Option<TipoEmpresa>,
    pub tipo_destino: Option<TipoEmpresa>,
}
