use chrono::NaiveDate;

use crate::models::dashboard::{RelevanciaParceiro, SinaisParceiro};

use super::percentual;

/// Pesos do score de relevância. Trocar pesos = nova versão.
#[derive(Debug, Clone, PartialEq)]
pub struct PoliticaRelevancia {
    pub versao: &'static str,
    // multiplica a cobertura (0..100)
    pub peso_cobertura: f64,
    pub bonus_por_cliente_novo: f64,
    pub teto_clientes_novos: f64,
    pub bonus_por_apresentacao: f64,
    pub teto_apresentacoes: f64,
    // multiplica a taxa de conversão (0..100)
    pub peso_conversao: f64,
    // multiplica a taxa de aprovação da wishlist (0..100)
    pub peso_aprovacao: f64,
    pub dias_recencia_alta: i64,
    pub bonus_recencia_alta: f64,
    pub dias_recencia_media: i64,
    pub bonus_recencia_media: f64,
    pub teto_score: f64,
}

impl PoliticaRelevancia {
    pub const V1: PoliticaRelevancia = PoliticaRelevancia {
        versao: "relevancia-v1",
        peso_cobertura: 0.4,
        bonus_por_cliente_novo: 4.0,
        teto_clientes_novos: 20.0,
        bonus_por_apresentacao: 2.0,
        teto_apresentacoes: 15.0,
        peso_conversao: 0.25,
        peso_aprovacao: 0.15,
        dias_recencia_alta: 30,
        bonus_recencia_alta: 10.0,
        dias_recencia_media: 90,
        bonus_recencia_media: 5.0,
        teto_score: 100.0,
    };

    fn bonus_recencia(&self, ultima: Option<NaiveDate>, hoje: NaiveDate) -> f64 {
        match ultima.map(|d| (hoje - d).num_days()) {
            Some(dias) if dias <= self.dias_recencia_alta => self.bonus_recencia_alta,
            Some(dias) if dias <= self.dias_recencia_media => self.bonus_recencia_media,
            _ => 0.0,
        }
    }
}

impl Default for PoliticaRelevancia {
    fn default() -> Self {
        Self::V1
    }
}

pub fn pontuar(sinais: &SinaisParceiro, politica: &PoliticaRelevancia, hoje: NaiveDate) -> RelevanciaParceiro {
    let cobertura = percentual(sinais.clientes_desejados, sinais.total_clientes);
    let taxa_conversao = percentual(sinais.oportunidades_ganhas, sinais.oportunidades);
    let taxa_aprovacao = percentual(sinais.wishlist_aprovados, sinais.wishlist_total);

    let score = cobertura * politica.peso_cobertura
        + (sinais.clientes_novos as f64 * politica.bonus_por_cliente_novo).min(politica.teto_clientes_novos)
        + (sinais.apresentacoes as f64 * politica.bonus_por_apresentacao).min(politica.teto_apresentacoes)
        + taxa_conversao * politica.peso_conversao
        + taxa_aprovacao * politica.peso_aprovacao
        + politica.bonus_recencia(sinais.ultima_interacao, hoje);

    RelevanciaParceiro {
        empresa_id: sinais.empresa_id,
        nome: sinais.nome.clone(),
        score: (score.min(politica.teto_score) * 100.0).round() / 100.0,
        cobertura,
        taxa_conversao,
        taxa_aprovacao,
        versao_politica: politica.versao.to_string(),
    }
}

/// Pontua e ordena (maior score primeiro).
pub fn ranquear(
    sinais: &[SinaisParceiro],
    politica: &PoliticaRelevancia,
    hoje: NaiveDate,
) -> Vec<RelevanciaParceiro> {
    let mut lista: Vec<RelevanciaParceiro> = sinais.iter().map(|s| pontuar(s, politica, hoje)).collect();
    lista.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.nome.cmp(&b.nome)));
    lista
}
