// src/services/meta_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    analytics::metas::{calcular_progresso, intervalo_da_meta, validar_periodo},
    common::error::AppError,
    db::{MetaRepository, OportunidadeRepository},
    models::meta::{DadosMeta, Meta, MetaProgresso, PeriodoMeta},
};

#[derive(Clone)]
pub struct MetaService {
    repo: MetaRepository,
    oportunidade_repo: OportunidadeRepository,
}

impl MetaService {
    pub fn new(repo: MetaRepository, oportunidade_repo: OportunidadeRepository) -> Self {
        Self { repo, oportunidade_repo }
    }

    pub async fn create<'e, E>(&self, executor: E, mut dados: DadosMeta) -> Result<Meta, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validar(&mut dados)?;
        self.repo.create(executor, &dados).await
    }

    pub async fn list<'e, E>(&self, executor: E, apenas_ativas: bool) -> Result<Vec<Meta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, apenas_ativas).await
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Meta, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.find_by_id(executor, id).await?.ok_or(AppError::NotFound("Meta"))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, mut dados: DadosMeta) -> Result<Meta, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validar(&mut dados)?;
        self.repo
            .update(executor, id, &dados)
            .await?
            .ok_or(AppError::NotFound("Meta"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::NotFound("Meta")),
            _ => Ok(()),
        }
    }

    pub async fn progresso<'e, E>(&self, executor: E, id: Uuid) -> Result<MetaProgresso, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let meta = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound("Meta"))?;

        let (inicio, fim) = intervalo_da_meta(&meta).unzip();
        let oportunidades = self
            .oportunidade_repo
            .list_detalhadas(&mut *conn, inicio, fim, None)
            .await?;

        Ok(calcular_progresso(&meta, &oportunidades, hoje()))
    }

    /// Progresso de todas as metas ativas, com uma única leitura das oportunidades.
    pub async fn progresso_ativas<'e, E>(&self, executor: E) -> Result<Vec<MetaProgresso>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let metas = self.repo.list(&mut *conn, true).await?;
        if metas.is_empty() {
            return Ok(Vec::new());
        }

        let intervalos: Vec<(NaiveDate, NaiveDate)> = metas.iter().filter_map(intervalo_da_meta).collect();
        let inicio = intervalos.iter().map(|(i, _)| *i).min();
        let fim = intervalos.iter().map(|(_, f)| *f).max();
        let oportunidades = self
            .oportunidade_repo
            .list_detalhadas(&mut *conn, inicio, fim, None)
            .await?;

        let hoje = hoje();
        Ok(metas
            .iter()
            .map(|meta| calcular_progresso(meta, &oportunidades, hoje))
            .collect())
    }
}

fn hoje() -> NaiveDate {
    Utc::now().date_naive()
}

// Período coerente e campo que não se aplica zerado
fn validar(dados: &mut DadosMeta) -> Result<(), AppError> {
    if dados.nome.trim().is_empty() {
        return Err(AppError::InvalidInput("nome é obrigatório".into()));
    }
    if dados.valor_meta <= Decimal::ZERO {
        return Err(AppError::InvalidInput("valor_meta deve ser maior que zero".into()));
    }
    validar_periodo(dados.periodo, dados.mes, dados.trimestre).map_err(AppError::InvalidInput)?;

    match dados.periodo {
        PeriodoMeta::Mensal => dados.trimestre = None,
        PeriodoMeta::Trimestral => dados.mes = None,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meta::{FiltroStatusMeta, SegmentoMeta, TipoMeta};

    fn dados(periodo: PeriodoMeta, mes: Option<i32>, trimestre: Option<i32>) -> DadosMeta {
        DadosMeta {
            nome: "Indicações".into(),
            descricao: None,
            tipo_meta: TipoMeta::Quantidade,
            valor_meta: Decimal::from(10),
            periodo,
            ano: 2025,
            mes,
            trimestre,
            segmento_grupo: SegmentoMeta::Tudo,
            status_oportunidade: FiltroStatusMeta::Todas,
            empresa_id: None,
            ativo: true,
        }
    }

    #[test]
    fn mensal_descarta_trimestre() {
        let mut d = dados(PeriodoMeta::Mensal, Some(3), Some(2));
        validar(&mut d).unwrap();
        assert_eq!(d.mes, Some(3));
        assert_eq!(d.trimestre, None);
    }

    #[test]
    fn trimestral_sem_trimestre_e_invalida() {
        let mut d = dados(PeriodoMeta::Trimestral, Some(3), None);
        assert!(matches!(validar(&mut d), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn valor_meta_precisa_ser_positivo() {
        let mut d = dados(PeriodoMeta::Mensal, Some(1), None);
        d.valor_meta = Decimal::ZERO;
        assert!(validar(&mut d).is_err());
    }
}
