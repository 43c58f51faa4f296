use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    dashboard::{FiltroPeriodo, RecebimentoEmpresa},
    empresa::TipoEmpresa,
    oportunidade::{OportunidadeDetalhada, StatusOportunidade},
};

use super::{percentual, resultados::filtrar};

/// Oportunidades recebidas por cada empresa do grupo, separando a origem.
pub fn analisar_recebimento(
    oportunidades: &[OportunidadeDetalhada],
    filtro: &FiltroPeriodo,
) -> Vec<RecebimentoEmpresa> {
    let mut por_destino: HashMap<Uuid, RecebimentoEmpresa> = HashMap::new();

    for op in filtrar(oportunidades, filtro).filter(|op| op.destino_tipo == TipoEmpresa::Intragrupo) {
        let destino = op.oportunidade.empresa_destino_id;
        let entrada = por_destino.entry(destino).or_insert_with(|| RecebimentoEmpresa {
            empresa_id: destino,
            nome: op.destino_nome.clone(),
            recebidas: 0,
            de_parceiros: 0,
            de_intragrupo: 0,
            ganhas: 0,
            taxa_conversao: 0.0,
            valor_ganho: Decimal::ZERO,
        });

        entrada.recebidas += 1;
        match op.origem_tipo {
            TipoEmpresa::Parceiro => entrada.de_parceiros += 1,
            TipoEmpresa::Intragrupo => entrada.de_intragrupo += 1,
            TipoEmpresa::Cliente => {}
        }
        if op.status() == StatusOportunidade::Ganho {
            entrada.ganhas += 1;
            entrada.valor_ganho += op.valor();
        }
    }

    let mut lista: Vec<RecebimentoEmpresa> = por_destino
        .into_values()
        .map(|mut r| {
            r.taxa_conversao = percentual(r.ganhas, r.recebidas);
            r
        })
        .collect();

    lista.sort_by(|a, b| b.recebidas.cmp(&a.recebidas).then_with(|| a.nome.cmp(&b.nome)));
    lista
}
