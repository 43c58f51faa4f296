use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{
    dashboard::SemanaTendencia,
    oportunidade::{OportunidadeDetalhada, StatusOportunidade},
};

fn segunda_feira(data: NaiveDate) -> NaiveDate {
    data - Duration::days(data.weekday().num_days_from_monday() as i64)
}

/// Últimas `semanas` semanas (segunda a domingo) terminando na semana de `hoje`,
/// da mais antiga para a mais recente. Semanas sem oportunidades aparecem zeradas.
pub fn tendencia_semanal(
    oportunidades: &[OportunidadeDetalhada],
    semanas: usize,
    hoje: NaiveDate,
) -> Vec<SemanaTendencia> {
    if semanas == 0 {
        return Vec::new();
    }

    let ultima = segunda_feira(hoje);
    let primeira = ultima - Duration::weeks(semanas as i64 - 1);

    let mut serie: Vec<SemanaTendencia> = (0..semanas)
        .map(|i| SemanaTendencia {
            inicio_semana: primeira + Duration::weeks(i as i64),
            total: 0,
            ganhas: 0,
        })
        .collect();

    for op in oportunidades {
        let inicio = segunda_feira(op.data_indicacao());
        if inicio < primeira || inicio > ultima {
            continue;
        }
        let indice = ((inicio - primeira).num_days() / 7) as usize;
        let semana = &mut serie[indice];
        semana.total += 1;
        if op.status() == StatusOportunidade::Ganho {
            semana.ganhas += 1;
        }
    }

    serie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::*;
    use crate::models::empresa::TipoEmpresa;

    #[test]
    fn agrupa_por_semana_iniciando_na_segunda() {
        let a = ponta("A", TipoEmpresa::Intragrupo);
        // 2025-03-12 é quarta-feira
        let hoje = dia(2025, 3, 12);
        let ops = vec![
            op(&a, &a, StatusOportunidade::Ganho, 1, dia(2025, 3, 10)),
            op(&a, &a, StatusOportunidade::EmContato, 1, dia(2025, 3, 16)),
            op(&a, &a, StatusOportunidade::Ganho, 1, dia(2025, 3, 3)),
            // fora da janela
            op(&a, &a, StatusOportunidade::Ganho, 1, dia(2025, 2, 1)),
            op(&a, &a, StatusOportunidade::Ganho, 1, dia(2025, 3, 17)),
        ];

        let serie = tendencia_semanal(&ops, 3, hoje);
        assert_eq!(serie.len(), 3);
        assert_eq!(serie[0].inicio_semana, dia(2025, 2, 24));
        assert_eq!(serie[0].total, 0);
        assert_eq!(serie[1].inicio_semana, dia(2025, 3, 3));
        assert_eq!(serie[1].ganhas, 1);
        assert_eq!(serie[2].inicio_semana, dia(2025, 3, 10));
        assert_eq!(serie[2].total, 2);
        assert_eq!(serie[2].ganhas, 1);
    }

    #[test]
    fn zero_semanas_e_vazio() {
        assert!(tendencia_semanal(&[], 0, dia(2025, 1, 1)).is_empty());
    }
}
