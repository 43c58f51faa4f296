// src/services/oportunidade_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OportunidadeRepository, WishlistRepository},
    models::oportunidade::{NovaOportunidade, Oportunidade, OportunidadeDetalhada, StatusOportunidade},
    services::pipeline_sync::map_opportunity_to_pipeline,
};

#[derive(Clone)]
pub struct OportunidadeService {
    repo: OportunidadeRepository,
    wishlist_repo: WishlistRepository,
}

impl OportunidadeService {
    pub fn new(repo: OportunidadeRepository, wishlist_repo: WishlistRepository) -> Self {
        Self { repo, wishlist_repo }
    }

    pub async fn create<'e, E>(&self, executor: E, mut nova: NovaOportunidade) -> Result<Oportunidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        preparar(&mut nova, Utc::now().date_naive())?;
        let oportunidade = self.repo.create(executor, &nova).await?;
        tracing::info!("Oportunidade {} criada ({})", oportunidade.id, oportunidade.status);
        Ok(oportunidade)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        inicio: Option<NaiveDate>,
        fim: Option<NaiveDate>,
        status: Option<StatusOportunidade>,
    ) -> Result<Vec<OportunidadeDetalhada>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if let (Some(inicio), Some(fim)) = (inicio, fim) {
            if inicio > fim {
                return Err(AppError::InvalidInput("inicio deve ser anterior a fim".into()));
            }
        }
        self.repo.list_detalhadas(executor, inicio, fim, status).await
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Oportunidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))
    }

    /// Atualiza a oportunidade e, se o status mudou, leva as apresentações vinculadas
    /// para a fase correspondente (mesma transação).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        mut dados: NovaOportunidade,
    ) -> Result<Oportunidade, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        preparar(&mut dados, Utc::now().date_naive())?;

        let mut tx = executor.begin().await?;

        let anterior = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;
        let atualizada = self
            .repo
            .update(&mut *tx, id, &dados)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;

        if anterior.status != atualizada.status {
            self.sincronizar_apresentacoes(&mut tx, &atualizada).await?;
        }

        tx.commit().await?;
        Ok(atualizada)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusOportunidade,
    ) -> Result<Oportunidade, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let atualizada = self
            .repo
            .update_status(&mut *tx, id, status, Utc::now().date_naive())
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;
        self.sincronizar_apresentacoes(&mut tx, &atualizada).await?;

        tx.commit().await?;
        Ok(atualizada)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::NotFound("Oportunidade")),
            _ => Ok(()),
        }
    }

    async fn sincronizar_apresentacoes(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        oportunidade: &Oportunidade,
    ) -> Result<(), AppError> {
        let fase = map_opportunity_to_pipeline(oportunidade.status);
        let afetadas = self
            .wishlist_repo
            .update_fase_by_oportunidade(&mut **tx, oportunidade.id, fase)
            .await?;

        if afetadas > 0 {
            tracing::info!(
                "Oportunidade {} -> {}: {} apresentação(ões) movida(s) para {}",
                oportunidade.id,
                oportunidade.status,
                afetadas,
                fase
            );
        }
        Ok(())
    }
}

// Regras comuns a criação e atualização (inclusive a automática, pela wishlist).
// Desfecho sem data de fechamento recebe `hoje`.
pub(crate) fn preparar(dados: &mut NovaOportunidade, hoje: NaiveDate) -> Result<(), AppError> {
    if dados.empresa_origem_id == dados.empresa_destino_id {
        return Err(AppError::BusinessRule(
            "Origem e destino da oportunidade devem ser empresas diferentes.".into(),
        ));
    }
    if dados.valor.is_some_and(|v| v < Decimal::ZERO) {
        return Err(AppError::InvalidInput("valor não pode ser negativo".into()));
    }
    if !dados.status.em_andamento() && dados.data_fechamento.is_none() {
        dados.data_fechamento = Some(hoje);
    }
    if dados.data_fechamento.is_some_and(|f| f < dados.data_indicacao) {
        return Err(AppError::InvalidInput(
            "data_fechamento não pode ser anterior a data_indicacao".into(),
        ));
    }
    Ok(())
}
