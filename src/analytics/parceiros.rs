use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    dashboard::{CelulaMatriz, FiltroPeriodo, PainelParceiros, ParceiroStats},
    empresa::TipoEmpresa,
    oportunidade::{OportunidadeDetalhada, StatusOportunidade},
};

use super::{percentual, resultados::filtrar};

#[derive(Default)]
struct Acumulador {
    nome: String,
    enviadas: usize,
    recebidas: usize,
    ganhas: usize,
    valor_gerado: Decimal,
}

/// Ranking dos parceiros + matriz origem x destino, numa única passada.
pub fn calcular_painel(
    oportunidades: &[OportunidadeDetalhada],
    filtro: &FiltroPeriodo,
) -> PainelParceiros {
    let mut por_parceiro: HashMap<Uuid, Acumulador> = HashMap::new();
    let mut matriz: HashMap<(Uuid, Uuid), CelulaMatriz> = HashMap::new();

    for op in filtrar(oportunidades, filtro) {
        let origem = op.oportunidade.empresa_origem_id;
        let destino = op.oportunidade.empresa_destino_id;

        if op.origem_tipo == TipoEmpresa::Parceiro {
            let acc = por_parceiro.entry(origem).or_default();
            acc.nome.clone_from(&op.origem_nome);
            acc.enviadas += 1;
            if op.status() == StatusOportunidade::Ganho {
                acc.ganhas += 1;
                acc.valor_gerado += op.valor();
            }
        }

        if op.destino_tipo == TipoEmpresa::Parceiro {
            let acc = por_parceiro.entry(destino).or_default();
            acc.nome.clone_from(&op.destino_nome);
            acc.recebidas += 1;
        }

        matriz
            .entry((origem, destino))
            .or_insert_with(|| CelulaMatriz {
                origem_id: origem,
                origem_nome: op.origem_nome.clone(),
                destino_id: destino,
                destino_nome: op.destino_nome.clone(),
                quantidade: 0,
            })
            .quantidade += 1;
    }

    let mut ranking: Vec<ParceiroStats> = por_parceiro
        .into_iter()
        .map(|(empresa_id, acc)| ParceiroStats {
            posicao: 0,
            empresa_id,
            taxa_conversao: percentual(acc.ganhas, acc.enviadas),
            saldo: acc.enviadas as i64 - acc.recebidas as i64,
            nome: acc.nome,
            indicacoes_enviadas: acc.enviadas,
            indicacoes_recebidas: acc.recebidas,
            ganhas: acc.ganhas,
            valor_gerado: acc.valor_gerado,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.indicacoes_enviadas
            .cmp(&a.indicacoes_enviadas)
            .then(b.ganhas.cmp(&a.ganhas))
            .then_with(|| a.nome.cmp(&b.nome))
    });
    for (i, p) in ranking.iter_mut().enumerate() {
        p.posicao = i + 1;
    }

    let mut matriz: Vec<CelulaMatriz> = matriz.into_values().collect();
    matriz.sort_by(|a, b| {
        b.quantidade
            .cmp(&a.quantidade)
            .then_with(|| a.origem_nome.cmp(&b.origem_nome))
            .then_with(|| a.destino_nome.cmp(&b.destino_nome))
    });

    PainelParceiros { ranking, matriz }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::*;

    #[test]
    fn sem_oportunidades_nao_ha_ranking() {
        let painel = calcular_painel(&[], &FiltroPeriodo::default());
        assert!(painel.ranking.is_empty());
        assert!(painel.matriz.is_empty());
    }

    #[test]
    fn ranqueia_por_indicacoes_enviadas() {
        let grupo = ponta("Grupo", TipoEmpresa::Intragrupo);
        let alfa = ponta("Alfa", TipoEmpresa::Parceiro);
        let beta = ponta("Beta", TipoEmpresa::Parceiro);
        let d = dia(2025, 4, 1);

        let ops = vec![
            op(&alfa, &grupo, StatusOportunidade::Ganho, 300, d),
            op(&beta, &grupo, StatusOportunidade::Ganho, 100, d),
            op(&beta, &grupo, StatusOportunidade::Perdido, 100, d),
            op(&grupo, &alfa, StatusOportunidade::EmContato, 50, d),
        ];

        let painel = calcular_painel(&ops, &FiltroPeriodo::default());
        assert_eq!(painel.ranking.len(), 2);

        let primeiro = &painel.ranking[0];
        assert_eq!(primeiro.nome, "Beta");
        assert_eq!(primeiro.posicao, 1);
        assert_eq!(primeiro.indicacoes_enviadas, 2);
        assert_eq!(primeiro.taxa_conversao, 50.0);
        assert_eq!(primeiro.saldo, 2);

        let segundo = &painel.ranking[1];
        assert_eq!(segundo.nome, "Alfa");
        assert_eq!(segundo.indicacoes_recebidas, 1);
        assert_eq!(segundo.saldo, 0);
        assert_eq!(segundo.valor_gerado, Decimal::from(300));

        assert_eq!(painel.matriz[0].quantidade, 2);
        assert_eq!(painel.matriz[0].origem_nome, "Beta");
        assert_eq!(painel.matriz.len(), 3);
    }

    #[test]
    fn parceiro_que_so_recebe_tem_taxa_zero() {
        let grupo = ponta("Grupo", TipoEmpresa::Intragrupo);
        let alfa = ponta("Alfa", TipoEmpresa::Parceiro);
        let ops = vec![op(&grupo, &alfa, StatusOportunidade::Ganho, 10, dia(2025, 1, 1))];

        let painel = calcular_painel(&ops, &FiltroPeriodo::default());
        assert_eq!(painel.ranking[0].taxa_conversao, 0.0);
        assert_eq!(painel.ranking[0].saldo, -1);
    }
}
