//! Cálculos de dashboard sobre oportunidades já carregadas.
//!
//! Tudo aqui é síncrono e sem I/O: os services buscam os registros e chamam estas funções.
//! Nenhuma divisão por zero: denominador zero sempre resulta em 0.

pub mod compatibilidade;
pub mod metas;
pub mod parceiros;
pub mod recebimento;
pub mod relevancia;
pub mod resultados;
pub mod tendencia;

use rust_decimal::Decimal;

pub(crate) fn percentual(parte: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        parte as f64 / total as f64 * 100.0
    }
}

pub(crate) fn media(soma: Decimal, quantidade: usize) -> Decimal {
    if quantidade == 0 {
        Decimal::ZERO
    } else {
        (soma / Decimal::from(quantidade as u64)).round_dp(2)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{
        empresa::TipoEmpresa,
        oportunidade::{Oportunidade, OportunidadeDetalhada, StatusOportunidade},
    };

    #[derive(Clone)]
    pub struct Ponta {
        pub id: Uuid,
        pub nome: &'static str,
        pub tipo: TipoEmpresa,
    }

    pub fn ponta(nome: &'static str, tipo: TipoEmpresa) -> Ponta {
        Ponta { id: Uuid::new_v4(), nome, tipo }
    }

    pub fn dia(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    pub fn op(
        origem: &Ponta,
        destino: &Ponta,
        status: StatusOportunidade,
        valor: i64,
        data: NaiveDate,
    ) -> OportunidadeDetalhada {
        let criada = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        OportunidadeDetalhada {
            oportunidade: Oportunidade {
                id: Uuid::new_v4(),
                empresa_origem_id: origem.id,
                empresa_destino_id: destino.id,
                status,
                valor: Some(Decimal::from(valor)),
                data_indicacao: data,
                data_fechamento: None,
                observacoes: None,
                created_at: criada,
                updated_at: criada,
            },
            origem_nome: origem.nome.to_string(),
            origem_tipo: origem.tipo,
            destino_nome: destino.nome.to_string(),
            destino_tipo: destino.tipo,
        }
    }
}
