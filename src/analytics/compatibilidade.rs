use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::sugestao::{CandidatoParceiro, SugestaoParceiro};

/// Pesos da compatibilidade parceiro x oportunidade (somam 100).
#[derive(Debug, Clone, PartialEq)]
pub struct PoliticaSugestao {
    pub versao: &'static str,
    // volume de indicações, normalizado pelo maior candidato
    pub peso_indicador: f64,
    // taxa de ganho histórica
    pub peso_historico: f64,
    pub teto_historico: f64,
    // proximidade entre ticket médio do parceiro e valor da oportunidade
    pub peso_porte: f64,
    // posição no ranking da IA
    pub peso_ia: f64,
    pub limite_resultados: usize,
}

impl PoliticaSugestao {
    pub const V1: PoliticaSugestao = PoliticaSugestao {
        versao: "sugestao-v1",
        peso_indicador: 40.0,
        peso_historico: 30.0,
        teto_historico: 30.0,
        peso_porte: 20.0,
        peso_ia: 10.0,
        limite_resultados: 5,
    };
}

impl Default for PoliticaSugestao {
    fn default() -> Self {
        Self::V1
    }
}

// 0..=1; sem valor de um dos lados o encaixe é neutro (0.5)
fn encaixe_de_porte(valor_oportunidade: Option<Decimal>, ticket_medio: Option<Decimal>) -> f64 {
    let (Some(a), Some(b)) = (
        valor_oportunidade.and_then(|v| v.to_f64()),
        ticket_medio.and_then(|v| v.to_f64()),
    ) else {
        return 0.5;
    };
    if a <= 0.0 || b <= 0.0 {
        return 0.5;
    }
    1.0 - (a - b).abs() / a.max(b)
}

/// Score de cada candidato e os `limite_resultados` melhores.
/// `ranking_ia` é a ordem sugerida pela IA (pode ser vazia).
pub fn pontuar_candidatos(
    valor_oportunidade: Option<Decimal>,
    candidatos: &[CandidatoParceiro],
    ranking_ia: &[Uuid],
    politica: &PoliticaSugestao,
) -> Vec<SugestaoParceiro> {
    let max_indicacoes = candidatos.iter().map(|c| c.indicacoes).max().unwrap_or(0);

    let mut sugestoes: Vec<SugestaoParceiro> = candidatos
        .iter()
        .map(|c| {
            let mut motivos = Vec::new();

            let indicador = if max_indicacoes > 0 {
                c.indicacoes as f64 / max_indicacoes as f64 * politica.peso_indicador
            } else {
                0.0
            };
            if c.indicacoes > 0 {
                motivos.push(format!("{} indicações registradas", c.indicacoes));
            }

            let taxa_ganho = if c.indicacoes > 0 { c.ganhas as f64 / c.indicacoes as f64 } else { 0.0 };
            let historico = (taxa_ganho * politica.peso_historico).min(politica.teto_historico);
            if c.ganhas > 0 {
                motivos.push(format!(
                    "{} negócios ganhos ({:.0}% de conversão)",
                    c.ganhas,
                    taxa_ganho * 100.0
                ));
            }

            let encaixe = encaixe_de_porte(valor_oportunidade, c.valor_medio);
            let porte = encaixe * politica.peso_porte;
            if encaixe >= 0.7 && c.valor_medio.is_some() && valor_oportunidade.is_some() {
                motivos.push("Ticket médio compatível com o valor da oportunidade".to_string());
            }

            let ia = match ranking_ia.iter().position(|id| *id == c.empresa_id) {
                Some(pos) => {
                    motivos.push(format!("Recomendado pela IA (#{})", pos + 1));
                    politica.peso_ia * (ranking_ia.len() - pos) as f64 / ranking_ia.len() as f64
                }
                None => 0.0,
            };

            if motivos.is_empty() {
                motivos.push("Parceiro ativo sem histórico relevante".to_string());
            }

            let score = (indicador + historico + porte + ia).clamp(0.0, 100.0);
            SugestaoParceiro {
                empresa_id: c.empresa_id,
                nome: c.nome.clone(),
                score: (score * 100.0).round() / 100.0,
                motivos,
            }
        })
        .collect();

    sugestoes.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.nome.cmp(&b.nome)));
    sugestoes.truncate(politica.limite_resultados);
    sugestoes
}
