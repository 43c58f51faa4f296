// src/services/wishlist_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Acquire, Executor, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::WishlistSyncConfig,
    db::{OportunidadeRepository, WishlistRepository},
    models::{
        oportunidade::{NovaOportunidade, Oportunidade, StatusOportunidade},
        wishlist::{
            FaseAtualizada, FasePipeline, NovaApresentacao, NovoWishlistItem, StatusWishlist,
            WishlistApresentacao, WishlistItem,
        },
    },
    services::{
        oportunidade_service::preparar,
        pipeline_sync::{map_pipeline_to_opportunity_status, should_auto_create_opp, AutoCreateCheck},
    },
};

// O que fazer com a oportunidade depois que a fase mudou
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcaoSync {
    Nenhuma,
    AtualizarStatus(Uuid, StatusOportunidade),
    CriarOportunidade(StatusOportunidade),
}

fn planejar_sync(apresentacao: &WishlistApresentacao, cfg: &WishlistSyncConfig) -> AcaoSync {
    let status = map_pipeline_to_opportunity_status(apresentacao.fase_pipeline);

    if let Some(oportunidade_id) = apresentacao.oportunidade_id {
        return AcaoSync::AtualizarStatus(oportunidade_id, status);
    }

    let check = AutoCreateCheck {
        fase_pipeline: apresentacao.fase_pipeline,
        oportunidade_id: apresentacao.oportunidade_id,
        created_at: apresentacao.created_at,
        start_at: cfg.start_at,
        create_on_presented: cfg.create_on_presented,
    };
    if cfg.auto_create_opp && should_auto_create_opp(&check) {
        AcaoSync::CriarOportunidade(status)
    } else {
        AcaoSync::Nenhuma
    }
}

#[derive(Clone)]
pub struct WishlistService {
    repo: WishlistRepository,
    oportunidade_repo: OportunidadeRepository,
    cfg: WishlistSyncConfig,
}

impl WishlistService {
    pub fn new(repo: WishlistRepository, oportunidade_repo: OportunidadeRepository, cfg: WishlistSyncConfig) -> Self {
        Self {
            repo,
            oportunidade_repo,
            cfg,
        }
    }

    // =========================================================================
    //  1. ITENS DA WISHLIST
    // =========================================================================

    pub async fn create_item<'e, E>(&self, executor: E, novo: NovoWishlistItem) -> Result<WishlistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !(1..=5).contains(&novo.prioridade) {
            return Err(AppError::InvalidInput("prioridade deve estar entre 1 e 5".into()));
        }
        if novo.empresa_interessada_id == novo.empresa_desejada_id {
            return Err(AppError::BusinessRule(
                "A empresa interessada e a desejada devem ser diferentes.".into(),
            ));
        }
        // O dono vira a origem da oportunidade automática e o interessado o destino
        if novo.empresa_proprietaria_id == novo.empresa_interessada_id {
            return Err(AppError::BusinessRule(
                "A empresa interessada não pode ser a dona do relacionamento.".into(),
            ));
        }

        self.repo
            .create_item(
                executor,
                novo.empresa_interessada_id,
                novo.empresa_desejada_id,
                novo.empresa_proprietaria_id,
                novo.motivo.as_deref(),
                novo.prioridade,
                novo.observacoes.as_deref(),
            )
            .await
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        status: Option<StatusWishlist>,
    ) -> Result<Vec<WishlistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_items(executor, status).await
    }

    pub async fn get_item<'e, E>(&self, executor: E, id: Uuid) -> Result<WishlistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_item(executor, id)
            .await?
            .ok_or(AppError::NotFound("Item da wishlist"))
    }

    pub async fn aprovar<'e, E>(&self, executor: E, id: Uuid) -> Result<WishlistItem, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.responder(executor, id, StatusWishlist::Aprovado).await
    }

    pub async fn rejeitar<'e, E>(&self, executor: E, id: Uuid) -> Result<WishlistItem, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.responder(executor, id, StatusWishlist::Rejeitado).await
    }

    // Só itens pendentes recebem resposta
    async fn responder<'e, E>(&self, executor: E, id: Uuid, status: StatusWishlist) -> Result<WishlistItem, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let item = self
            .repo
            .find_item(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Item da wishlist"))?;
        if item.status != StatusWishlist::Pendente {
            return Err(AppError::BusinessRule(format!(
                "O item já foi respondido (status atual: {:?}).",
                item.status
            )));
        }

        let atualizado = self
            .repo
            .update_item_status(&mut *tx, id, status, Some(Utc::now().date_naive()))
            .await?
            .ok_or(AppError::NotFound("Item da wishlist"))?;

        tx.commit().await?;
        Ok(atualizado)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_item(executor, id).await? {
            0 => Err(AppError::NotFound("Item da wishlist")),
            _ => Ok(()),
        }
    }

    // =========================================================================
    //  2. APRESENTAÇÕES (PIPELINE)
    // =========================================================================

    /// Registra uma apresentação. Se ela já nasce numa fase que dispara a criação
    /// automática, a oportunidade é criada na mesma transação.
    pub async fn create_apresentacao<'e, E>(
        &self,
        executor: E,
        wishlist_item_id: Uuid,
        nova: NovaApresentacao,
    ) -> Result<FaseAtualizada, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let item = self
            .repo
            .find_item(&mut *tx, wishlist_item_id)
            .await?
            .ok_or(AppError::NotFound("Item da wishlist"))?;
        if item.status == StatusWishlist::Rejeitado {
            return Err(AppError::BusinessRule(
                "Não é possível registrar apresentação de um item rejeitado.".into(),
            ));
        }

        let apresentacao = self
            .repo
            .create_apresentacao(
                &mut *tx,
                wishlist_item_id,
                nova.empresa_facilitadora_id,
                nova.data_apresentacao,
                nova.tipo_apresentacao,
                nova.fase_pipeline,
                nova.feedback.as_deref(),
            )
            .await?;

        let resultado = self.sincronizar(&mut tx, &item, apresentacao).await?;
        tx.commit().await?;
        Ok(resultado)
    }

    pub async fn list_apresentacoes<'e, E>(
        &self,
        executor: E,
        wishlist_item_id: Uuid,
    ) -> Result<Vec<WishlistApresentacao>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        if self.repo.find_item(&mut *conn, wishlist_item_id).await?.is_none() {
            return Err(AppError::NotFound("Item da wishlist"));
        }
        self.repo.list_apresentacoes(&mut *conn, wishlist_item_id).await
    }

    /// Muda a fase da apresentação e propaga para a oportunidade.
    ///
    /// A linha fica travada (`FOR UPDATE`) do início ao commit: duas chamadas
    /// concorrentes para a mesma apresentação nunca criam duas oportunidades.
    pub async fn update_fase<'e, E>(
        &self,
        executor: E,
        apresentacao_id: Uuid,
        fase: FasePipeline,
        feedback: Option<&str>,
    ) -> Result<FaseAtualizada, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let atual = self
            .repo
            .lock_apresentacao(&mut *tx, apresentacao_id)
            .await?
            .ok_or(AppError::NotFound("Apresentação"))?;

        let apresentacao = self
            .repo
            .update_fase(&mut *tx, apresentacao_id, fase, feedback)
            .await?;
        tracing::debug!(
            "Apresentação {}: {} -> {}",
            apresentacao_id,
            atual.fase_pipeline,
            apresentacao.fase_pipeline
        );

        let item = self
            .repo
            .find_item(&mut *tx, apresentacao.wishlist_item_id)
            .await?
            .ok_or(AppError::NotFound("Item da wishlist"))?;

        let resultado = self.sincronizar(&mut tx, &item, apresentacao).await?;
        tx.commit().await?;
        Ok(resultado)
    }

    async fn sincronizar(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: &WishlistItem,
        apresentacao: WishlistApresentacao,
    ) -> Result<FaseAtualizada, AppError> {
        match planejar_sync(&apresentacao, &self.cfg) {
            AcaoSync::Nenhuma => Ok(FaseAtualizada {
                apresentacao,
                oportunidade_criada: None,
            }),
            AcaoSync::AtualizarStatus(oportunidade_id, status) => {
                // Oportunidade apagada deixa o vínculo nulo (ON DELETE SET NULL); não deve chegar aqui
                if self
                    .oportunidade_repo
                    .update_status(&mut **tx, oportunidade_id, status, Utc::now().date_naive())
                    .await?
                    .is_none()
                {
                    tracing::warn!(
                        "Apresentação {} aponta para oportunidade inexistente {}",
                        apresentacao.id,
                        oportunidade_id
                    );
                }
                Ok(FaseAtualizada {
                    apresentacao,
                    oportunidade_criada: None,
                })
            }
            AcaoSync::CriarOportunidade(status) => {
                let hoje = Utc::now().date_naive();
                let mut nova = oportunidade_da_wishlist(item, status, hoje);
                preparar(&mut nova, hoje)?;
                let oportunidade = self.oportunidade_repo.create(&mut **tx, &nova).await?;

                let vinculada = self
                    .repo
                    .link_oportunidade(&mut **tx, apresentacao.id, oportunidade.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::UniqueConstraintViolation("A apresentação já possui oportunidade vinculada.".into())
                    })?;

                self.repo
                    .update_item_status(&mut **tx, item.id, StatusWishlist::Convertido, None)
                    .await?;

                tracing::info!(
                    "Oportunidade {} criada automaticamente a partir da apresentação {} (wishlist {})",
                    oportunidade.id,
                    vinculada.id,
                    item.id
                );

                Ok(FaseAtualizada {
                    apresentacao: vinculada,
                    oportunidade_criada: Some(oportunidade),
                })
            }
        }
    }
}

// Quem tem o relacionamento indica; quem pediu a apresentação recebe
fn oportunidade_da_wishlist(item: &WishlistItem, status: StatusOportunidade, hoje: NaiveDate) -> NovaOportunidade {
    NovaOportunidade {
        empresa_origem_id: item.empresa_proprietaria_id,
        empresa_destino_id: item.empresa_interessada_id,
        status,
        valor: None,
        data_indicacao: hoje,
        data_fechamento: None,
        observacoes: Some(format!("Criada automaticamente a partir da wishlist {}", item.id)),
    }
}
