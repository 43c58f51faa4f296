// src/db/wishlist_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::wishlist::{FasePipeline, StatusWishlist, TipoApresentacao, WishlistApresentacao, WishlistItem},
};

const COLUNAS_ITEM: &str = "id, empresa_interessada_id, empresa_desejada_id, empresa_proprietaria_id, \
                            motivo, prioridade, status, data_solicitacao, data_resposta, observacoes, created_at";

const COLUNAS_APRESENTACAO: &str = "id, wishlist_item_id, empresa_facilitadora_id, data_apresentacao, \
                                    tipo_apresentacao, fase_pipeline, feedback, oportunidade_id, \
                                    converteu_oportunidade, created_at, updated_at";

#[derive(Clone)]
pub struct WishlistRepository {
    pool: PgPool,
}

impl WishlistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        interessada_id: Uuid,
        desejada_id: Uuid,
        proprietaria_id: Uuid,
        motivo: Option<&str>,
        prioridade: i16,
        observacoes: Option<&str>,
    ) -> Result<WishlistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO wishlist_items (
                empresa_interessada_id, empresa_desejada_id, empresa_proprietaria_id,
                motivo, prioridade, observacoes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUNAS_ITEM}
            "#
        );

        let item = sqlx::query_as::<_, WishlistItem>(&sql)
            .bind(interessada_id)
            .bind(desejada_id)
            .bind(proprietaria_id)
            .bind(motivo)
            .bind(prioridade)
            .bind(observacoes)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_foreign_key(e, "empresa informada não existe"))?;

        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        status: Option<StatusWishlist>,
    ) -> Result<Vec<WishlistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {COLUNAS_ITEM}
            FROM wishlist_items
            WHERE ($1::status_wishlist IS NULL OR status = $1)
            ORDER BY prioridade DESC, data_solicitacao DESC
            "#
        );

        let items = sqlx::query_as::<_, WishlistItem>(&sql)
            .bind(status)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    pub async fn find_item<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WishlistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COLUNAS_ITEM} FROM wishlist_items WHERE id = $1");
        let item = sqlx::query_as::<_, WishlistItem>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(item)
    }

    pub async fn update_item_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusWishlist,
        data_resposta: Option<NaiveDate>,
    ) -> Result<Option<WishlistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE wishlist_items
            SET status = $2, data_resposta = COALESCE($3, data_resposta)
            WHERE id = $1
            RETURNING {COLUNAS_ITEM}
            "#
        );

        let item = sqlx::query_as::<_, WishlistItem>(&sql)
            .bind(id)
            .bind(status)
            .bind(data_resposta)
            .fetch_optional(executor)
            .await?;

        Ok(item)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  APRESENTAÇÕES
    // =========================================================================

    pub async fn create_apresentacao<'e, E>(
        &self,
        executor: E,
        wishlist_item_id: Uuid,
        facilitadora_id: Uuid,
        data_apresentacao: NaiveDate,
        tipo: TipoApresentacao,
        fase: FasePipeline,
        feedback: Option<&str>,
    ) -> Result<WishlistApresentacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO wishlist_apresentacoes (
                wishlist_item_id, empresa_facilitadora_id, data_apresentacao,
                tipo_apresentacao, fase_pipeline, feedback
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUNAS_APRESENTACAO}
            "#
        );

        let apresentacao = sqlx::query_as::<_, WishlistApresentacao>(&sql)
            .bind(wishlist_item_id)
            .bind(facilitadora_id)
            .bind(data_apresentacao)
            .bind(tipo)
            .bind(fase)
            .bind(feedback)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_foreign_key(e, "empresa facilitadora não existe"))?;

        Ok(apresentacao)
    }

    pub async fn list_apresentacoes<'e, E>(
        &self,
        executor: E,
        wishlist_item_id: Uuid,
    ) -> Result<Vec<WishlistApresentacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {COLUNAS_APRESENTACAO}
            FROM wishlist_apresentacoes
            WHERE wishlist_item_id = $1
            ORDER BY data_apresentacao DESC
            "#
        );

        let lista = sqlx::query_as::<_, WishlistApresentacao>(&sql)
            .bind(wishlist_item_id)
            .fetch_all(executor)
            .await?;

        Ok(lista)
    }

    /// Lê a apresentação travando a linha até o fim da transação
    pub async fn lock_apresentacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<WishlistApresentacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COLUNAS_APRESENTACAO} FROM wishlist_apresentacoes WHERE id = $1 FOR UPDATE");
        let apresentacao = sqlx::query_as::<_, WishlistApresentacao>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(apresentacao)
    }

    pub async fn update_fase<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fase: FasePipeline,
        feedback: Option<&str>,
    ) -> Result<WishlistApresentacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE wishlist_apresentacoes
            SET fase_pipeline = $2, feedback = COALESCE($3, feedback), updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUNAS_APRESENTACAO}
            "#
        );

        let apresentacao = sqlx::query_as::<_, WishlistApresentacao>(&sql)
            .bind(id)
            .bind(fase)
            .bind(feedback)
            .fetch_one(executor)
            .await?;

        Ok(apresentacao)
    }

    /// Grava o vínculo só se ainda não houver um (segunda barreira contra duplicidade)
    pub async fn link_oportunidade<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        oportunidade_id: Uuid,
    ) -> Result<Option<WishlistApresentacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE wishlist_apresentacoes
            SET oportunidade_id = $2, converteu_oportunidade = TRUE, updated_at = NOW()
            WHERE id = $1 AND oportunidade_id IS NULL
            RETURNING {COLUNAS_APRESENTACAO}
            "#
        );

        let apresentacao = sqlx::query_as::<_, WishlistApresentacao>(&sql)
            .bind(id)
            .bind(oportunidade_id)
            .fetch_optional(executor)
            .await?;

        Ok(apresentacao)
    }

    /// Sincronização reversa: status da oportunidade -> fase das apresentações vinculadas
    pub async fn update_fase_by_oportunidade<'e, E>(
        &self,
        executor: E,
        oportunidade_id: Uuid,
        fase: FasePipeline,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE wishlist_apresentacoes
            SET fase_pipeline = $2, updated_at = NOW()
            WHERE oportunidade_id = $1 AND fase_pipeline <> $2
            "#,
        )
        .bind(oportunidade_id)
        .bind(fase)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
