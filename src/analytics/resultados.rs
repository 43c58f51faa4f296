use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    dashboard::{ContagemStatus, FiltroPeriodo, ResultadosStats},
    oportunidade::{OportunidadeDetalhada, StatusOportunidade},
};

use super::{media, percentual};

/// Aplica intervalo de datas (inclusivo) e o par de tipos origem/destino.
pub fn filtrar<'a>(
    oportunidades: &'a [OportunidadeDetalhada],
    filtro: &'a FiltroPeriodo,
) -> impl Iterator<Item = &'a OportunidadeDetalhada> + 'a {
    oportunidades.iter().filter(move |op| {
        let data = op.data_indicacao();
        filtro.inicio.is_none_or(|inicio| data >= inicio)
            && filtro.fim.is_none_or(|fim| data <= fim)
            && filtro.tipo_origem.is_none_or(|t| op.origem_tipo == t)
            && filtro.tipo_destino.is_none_or(|t| op.destino_tipo == t)
    })
}

pub fn calcular_resultados(
    oportunidades: &[OportunidadeDetalhada],
    filtro: &FiltroPeriodo,
) -> ResultadosStats {
    let mut total = 0usize;
    let mut ganhas = 0usize;
    let mut perdidas = 0usize;
    let mut valor_total = Decimal::ZERO;
    let mut valor_ganho = Decimal::ZERO;
    let mut por_status: BTreeMap<StatusOportunidade, usize> = BTreeMap::new();

    for op in filtrar(oportunidades, filtro) {
        total += 1;
        valor_total += op.valor();
        *por_status.entry(op.status()).or_default() += 1;

        match op.status() {
            StatusOportunidade::Ganho => {
                ganhas += 1;
                valor_ganho += op.valor();
            }
            StatusOportunidade::Perdido => perdidas += 1,
            _ => {}
        }
    }

    ResultadosStats {
        total,
        ganhas,
        perdidas,
        em_andamento: total - ganhas - perdidas,
        taxa_conversao: percentual(ganhas, total),
        valor_total,
        valor_ganho,
        ticket_medio: media(valor_total, total),
        por_status: por_status
            .into_iter()
            .map(|(status, quantidade)| ContagemStatus { status, quantidade })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::*;
    use crate::models::empresa::TipoEmpresa;

    #[test]
    fn lista_vazia_zera_tudo() {
        let stats = calcular_resultados(&[], &FiltroPeriodo::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.taxa_conversao, 0.0);
        assert_eq!(stats.ticket_medio, Decimal::ZERO);
        assert_eq!(stats.valor_total, Decimal::ZERO);
        assert!(!stats.taxa_conversao.is_nan());
        assert!(stats.por_status.is_empty());
    }

    #[test]
    fn cenario_ganho_perdido_em_contato() {
        let a = ponta("A", TipoEmpresa::Intragrupo);
        let b = ponta("B", TipoEmpresa::Parceiro);
        let d = dia(2025, 3, 5);
        let ops = vec![
            op(&a, &b, StatusOportunidade::Ganho, 1000, d),
            op(&a, &b, StatusOportunidade::Perdido, 500, d),
            op(&a, &b, StatusOportunidade::EmContato, 200, d),
        ];

        let stats = calcular_resultados(&ops, &FiltroPeriodo::default());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.ganhas, 1);
        assert_eq!(stats.perdidas, 1);
        assert_eq!(stats.em_andamento, 1);
        assert!((stats.taxa_conversao - 33.333).abs() < 0.01);
        assert_eq!(stats.valor_total, Decimal::from(1700));
        assert_eq!(stats.valor_ganho, Decimal::from(1000));
        assert_eq!(stats.ticket_medio, "566.67".parse::<Decimal>().unwrap());
    }

    #[test]
    fn filtra_por_periodo_e_tipos() {
        let grupo = ponta("Grupo", TipoEmpresa::Intragrupo);
        let parceiro = ponta("Parceiro", TipoEmpresa::Parceiro);
        let ops = vec![
            op(&parceiro, &grupo, StatusOportunidade::Ganho, 100, dia(2025, 1, 10)),
            op(&grupo, &grupo, StatusOportunidade::Ganho, 100, dia(2025, 1, 15)),
            op(&parceiro, &grupo, StatusOportunidade::Ganho, 100, dia(2025, 2, 10)),
        ];

        let filtro = FiltroPeriodo {
            inicio: Some(dia(2025, 1, 1)),
            fim: Some(dia(2025, 1, 31)),
            tipo_origem: Some(TipoEmpresa::Parceiro),
            tipo_destino: Some(TipoEmpresa::Intragrupo),
        };
        let stats = calcular_resultados(&ops, &filtro);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.taxa_conversao, 100.0);
    }

    #[test]
    fn limites_do_periodo_sao_inclusivos() {
        let a = ponta("A", TipoEmpresa::Intragrupo);
        let ops = vec![
            op(&a, &a, StatusOportunidade::EmContato, 0, dia(2025, 1, 1)),
            op(&a, &a, StatusOportunidade::EmContato, 0, dia(2025, 1, 31)),
        ];
        let filtro = FiltroPeriodo {
            inicio: Some(dia(2025, 1, 1)),
            fim: Some(dia(2025, 1, 31)),
            ..Default::default()
        };
        assert_eq!(calcular_resultados(&ops, &filtro).total, 2);
    }
}
