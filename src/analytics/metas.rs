use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    empresa::TipoEmpresa,
    meta::{FiltroStatusMeta, Meta, MetaProgresso, PeriodoMeta, SegmentoMeta, StatusProgresso, TipoMeta},
    oportunidade::{OportunidadeDetalhada, StatusOportunidade},
};

// Faixas de classificação (em %)
const LIMITE_DENTRO: f64 = 80.0;
const LIMITE_ACIMA: f64 = 100.0;

/// Primeiro e último dia do período da meta. `None` se mês/trimestre estiverem ausentes ou fora da faixa.
pub fn intervalo_da_meta(meta: &Meta) -> Option<(NaiveDate, NaiveDate)> {
    let (mes_inicial, meses) = match meta.periodo {
        PeriodoMeta::Mensal => (u32::try_from(meta.mes?).ok()?, 1),
        PeriodoMeta::Trimestral => {
            let trimestre = u32::try_from(meta.trimestre?).ok()?;
            if !(1..=4).contains(&trimestre) {
                return None;
            }
            ((trimestre - 1) * 3 + 1, 3)
        }
    };

    let inicio = NaiveDate::from_ymd_opt(meta.ano, mes_inicial, 1)?;
    let mes_seguinte = mes_inicial + meses;
    let proximo_inicio = if mes_seguinte > 12 {
        NaiveDate::from_ymd_opt(meta.ano + 1, mes_seguinte - 12, 1)?
    } else {
        NaiveDate::from_ymd_opt(meta.ano, mes_seguinte, 1)?
    };
    Some((inicio, proximo_inicio.pred_opt()?))
}

fn no_segmento(segmento: SegmentoMeta, op: &OportunidadeDetalhada) -> bool {
    match segmento {
        SegmentoMeta::Intragrupo => {
            op.origem_tipo == TipoEmpresa::Intragrupo && op.destino_tipo == TipoEmpresa::Intragrupo
        }
        SegmentoMeta::DeFora => {
            op.origem_tipo != TipoEmpresa::Intragrupo && op.destino_tipo == TipoEmpresa::Intragrupo
        }
        SegmentoMeta::Tudo => true,
    }
}

pub fn classificar(percentual: f64) -> StatusProgresso {
    if percentual >= LIMITE_ACIMA {
        StatusProgresso::Acima
    } else if percentual >= LIMITE_DENTRO {
        StatusProgresso::Dentro
    } else {
        StatusProgresso::Abaixo
    }
}

fn percentual_de(realizado: Decimal, alvo: Decimal) -> f64 {
    if alvo <= Decimal::ZERO {
        return 0.0;
    }
    (realizado * Decimal::ONE_HUNDRED / alvo)
        .to_f64()
        .unwrap_or(0.0)
}

/// Progresso da meta em `hoje`, com projeção linear até o fim do período.
pub fn calcular_progresso(
    meta: &Meta,
    oportunidades: &[OportunidadeDetalhada],
    hoje: NaiveDate,
) -> MetaProgresso {
    let intervalo = intervalo_da_meta(meta);

    let consideradas: Vec<&OportunidadeDetalhada> = match intervalo {
        Some((inicio, fim)) => oportunidades
            .iter()
            .filter(|op| (inicio..=fim).contains(&op.data_indicacao()))
            .filter(|op| no_segmento(meta.segmento_grupo, op))
            .filter(|op| meta.empresa_id.is_none_or(|id| op.oportunidade.empresa_destino_id == id))
            .filter(|op| match meta.status_oportunidade {
                FiltroStatusMeta::Todas => true,
                FiltroStatusMeta::Ganhas => op.status() == StatusOportunidade::Ganho,
            })
            .collect(),
        None => Vec::new(),
    };

    let realizado = match meta.tipo_meta {
        TipoMeta::Quantidade => Decimal::from(consideradas.len() as u64),
        TipoMeta::Valor => consideradas.iter().map(|op| op.valor()).sum(),
    };

    let percentual = percentual_de(realizado, meta.valor_meta);

    let projecao = match intervalo {
        Some((inicio, fim)) if hoje >= inicio && hoje < fim => {
            let decorridos = (hoje - inicio).num_days() + 1;
            let totais = (fim - inicio).num_days() + 1;
            (realizado * Decimal::from(totais) / Decimal::from(decorridos)).round_dp(2)
        }
        _ => realizado,
    };

    MetaProgresso {
        meta: meta.clone(),
        realizado,
        percentual,
        status: classificar(percentual),
        projecao,
        probabilidade: percentual_de(projecao, meta.valor_meta).min(100.0),
        oportunidades_consideradas: consideradas.len(),
    }
}

/// Mês/trimestre exigidos de acordo com o período.
pub fn validar_periodo(periodo: PeriodoMeta, mes: Option<i32>, trimestre: Option<i32>) -> Result<(), String> {
    match periodo {
        PeriodoMeta::Mensal => match mes {
            Some(m) if (1..=12).contains(&m) => Ok(()),
            _ => Err("meta mensal exige 'mes' entre 1 e 12".to_string()),
        },
        PeriodoMeta::Trimestral => match trimestre {
            Some(t) if (1..=4).contains(&t) => Ok(()),
            _ => Err("meta trimestral exige 'trimestre' entre 1 e 4".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn meta_mensal(tipo_meta: TipoMeta, alvo: i64) -> Meta {
        Meta {
            id: Uuid::new_v4(),
            nome: "Indicações de março".to_string(),
            descricao: None,
            tipo_meta,
            valor_meta: Decimal::from(alvo),
            periodo: PeriodoMeta::Mensal,
            ano: 2025,
            mes: Some(3),
            trimestre: None,
            segmento_grupo: SegmentoMeta::Tudo,
            status_oportunidade: FiltroStatusMeta::Todas,
            empresa_id: None,
            ativo: true,
            created_at: Utc::now(),
        }
    }

    fn n_oportunidades(n: usize, data: NaiveDate) -> Vec<OportunidadeDetalhada> {
        let a = ponta("A", TipoEmpresa::Intragrupo);
        let b = ponta("B", TipoEmpresa::Parceiro);
        (0..n).map(|_| op(&b, &a, StatusOportunidade::EmContato, 100, data)).collect()
    }

    #[test]
    fn oito_de_dez_fica_dentro() {
        let meta = meta_mensal(TipoMeta::Quantidade, 10);
        let ops = n_oportunidades(8, dia(2025, 3, 5));
        let progresso = calcular_progresso(&meta, &ops, dia(2025, 4, 2));
        assert_eq!(progresso.percentual, 80.0);
        assert_eq!(progresso.status, StatusProgresso::Dentro);
        assert_eq!(progresso.realizado, Decimal::from(8));
    }

    #[test]
    fn dez_ou_mais_fica_acima() {
        let meta = meta_mensal(TipoMeta::Quantidade, 10);
        for n in [10, 12] {
            let ops = n_oportunidades(n, dia(2025, 3, 5));
            let progresso = calcular_progresso(&meta, &ops, dia(2025, 4, 2));
            assert_eq!(progresso.status, StatusProgresso::Acima);
        }
    }

    #[test]
    fn abaixo_de_oitenta_e_fora_do_periodo_nao_conta() {
        let meta = meta_mensal(TipoMeta::Quantidade, 10);
        let mut ops = n_oportunidades(7, dia(2025, 3, 31));
        ops.extend(n_oportunidades(5, dia(2025, 4, 1)));
        let progresso = calcular_progresso(&meta, &ops, dia(2025, 4, 2));
        assert_eq!(progresso.oportunidades_consideradas, 7);
        assert_eq!(progresso.status, StatusProgresso::Abaixo);
    }

    #[test]
    fn meta_de_valor_soma_os_valores() {
        let meta = meta_mensal(TipoMeta::Valor, 1000);
        let ops = n_oportunidades(5, dia(2025, 3, 1));
        let progresso = calcular_progresso(&meta, &ops, dia(2025, 4, 1));
        assert_eq!(progresso.realizado, Decimal::from(500));
        assert_eq!(progresso.percentual, 50.0);
    }

    #[test]
    fn segmentos_filtram_pelas_pontas() {
        let g = ponta("G", TipoEmpresa::Intragrupo);
        let p = ponta("P", TipoEmpresa::Parceiro);
        let d = dia(2025, 3, 3);
        let ops = vec![
            op(&g, &g, StatusOportunidade::Ganho, 1, d),
            op(&p, &g, StatusOportunidade::Ganho, 1, d),
            op(&g, &p, StatusOportunidade::Ganho, 1, d),
        ];

        let mut meta = meta_mensal(TipoMeta::Quantidade, 10);
        meta.segmento_grupo = SegmentoMeta::Intragrupo;
        assert_eq!(calcular_progresso(&meta, &ops, d).oportunidades_consideradas, 1);

        meta.segmento_grupo = SegmentoMeta::DeFora;
        assert_eq!(calcular_progresso(&meta, &ops, d).oportunidades_consideradas, 1);

        meta.segmento_grupo = SegmentoMeta::Tudo;
        assert_eq!(calcular_progresso(&meta, &ops, d).oportunidades_consideradas, 3);
    }

    #[test]
    fn filtro_de_ganhas() {
        let g = ponta("G", TipoEmpresa::Intragrupo);
        let d = dia(2025, 3, 3);
        let ops = vec![
            op(&g, &g, StatusOportunidade::Ganho, 1, d),
            op(&g, &g, StatusOportunidade::Perdido, 1, d),
        ];
        let mut meta = meta_mensal(TipoMeta::Quantidade, 10);
        meta.status_oportunidade = FiltroStatusMeta::Ganhas;
        assert_eq!(calcular_progresso(&meta, &ops, d).oportunidades_consideradas, 1);
    }

    #[test]
    fn projecao_linear_no_meio_do_periodo() {
        // Março tem 31 dias; no dia 10 já temos 5
        let meta = meta_mensal(TipoMeta::Quantidade, 10);
        let ops = n_oportunidades(5, dia(2025, 3, 2));
        let progresso = calcular_progresso(&meta, &ops, dia(2025, 3, 10));
        assert_eq!(progresso.projecao, "15.5".parse::<Decimal>().unwrap());
        assert_eq!(progresso.probabilidade, 100.0);
    }

    #[test]
    fn meta_zero_nao_divide() {
        let meta = meta_mensal(TipoMeta::Quantidade, 0);
        let ops = n_oportunidades(3, dia(2025, 3, 2));
        let progresso = calcular_progresso(&meta, &ops, dia(2025, 3, 10));
        assert_eq!(progresso.percentual, 0.0);
        assert_eq!(progresso.probabilidade, 0.0);
    }

    #[test]
    fn intervalo_trimestral_e_dezembro() {
        let mut meta = meta_mensal(TipoMeta::Quantidade, 1);
        meta.periodo = PeriodoMeta::Trimestral;
        meta.mes = None;
        meta.trimestre = Some(4);
        assert_eq!(intervalo_da_meta(&meta), Some((dia(2025, 10, 1), dia(2025, 12, 31))));

        meta.trimestre = Some(5);
        assert_eq!(intervalo_da_meta(&meta), None);

        meta.periodo = PeriodoMeta::Mensal;
        meta.mes = Some(12);
        assert_eq!(intervalo_da_meta(&meta), Some((dia(2025, 12, 1), dia(2025, 12, 31))));
    }

    #[test]
    fn valida_periodo() {
        assert!(validar_periodo(PeriodoMeta::Mensal, Some(1), None).is_ok());
        assert!(validar_periodo(PeriodoMeta::Mensal, None, Some(1)).is_err());
        assert!(validar_periodo(PeriodoMeta::Trimestral, None, Some(0)).is_err());
    }
}
