// src/db/oportunidade_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::oportunidade::{NovaOportunidade, Oportunidade, OportunidadeDetalhada, StatusOportunidade},
};

const COLUNAS: &str = "id, empresa_origem_id, empresa_destino_id, status, valor, data_indicacao, \
                       data_fechamento, observacoes, created_at, updated_at";

const SELECT_DETALHADA: &str = r#"
    SELECT
        o.id, o.empresa_origem_id, o.empresa_destino_id, o.status, o.valor,
        o.data_indicacao, o.data_fechamento, o.observacoes, o.created_at, o.updated_at,
        eo.nome AS origem_nome, eo.tipo AS origem_tipo,
        ed.nome AS destino_nome, ed.tipo AS destino_tipo
    FROM oportunidades o
    INNER JOIN empresas eo ON eo.id = o.empresa_origem_id
    INNER JOIN empresas ed ON ed.id = o.empresa_destino_id"#;

#[derive(Clone)]
pub struct OportunidadeRepository {
    pool: PgPool,
}

impl OportunidadeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create<'e, E>(&self, executor: E, nova: &NovaOportunidade) -> Result<Oportunidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO oportunidades (
                empresa_origem_id, empresa_destino_id, status, valor,
                data_indicacao, data_fechamento, observacoes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUNAS}
            "#
        );

        let oportunidade = sqlx::query_as::<_, Oportunidade>(&sql)
            .bind(nova.empresa_origem_id)
            .bind(nova.empresa_destino_id)
            .bind(nova.status)
            .bind(nova.valor)
            .bind(nova.data_indicacao)
            .bind(nova.data_fechamento)
            .bind(nova.observacoes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_foreign_key(e, "empresa de origem ou destino inexistente"))?;

        Ok(oportunidade)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Oportunidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COLUNAS} FROM oportunidades WHERE id = $1");
        let oportunidade = sqlx::query_as::<_, Oportunidade>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(oportunidade)
    }

    pub async fn find_detalhada<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<OportunidadeDetalhada>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SELECT_DETALHADA} WHERE o.id = $1");
        let oportunidade = sqlx::query_as::<_, OportunidadeDetalhada>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(oportunidade)
    }

    /// Oportunidades com nome/tipo das pontas. Filtros opcionais (datas inclusivas).
    pub async fn list_detalhadas<'e, E>(
        &self,
        executor: E,
        inicio: Option<NaiveDate>,
        fim: Option<NaiveDate>,
        status: Option<StatusOportunidade>,
    ) -> Result<Vec<OportunidadeDetalhada>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {SELECT_DETALHADA}
            WHERE ($1::date IS NULL OR o.data_indicacao >= $1)
              AND ($2::date IS NULL OR o.data_indicacao <= $2)
              AND ($3::status_oportunidade IS NULL OR o.status = $3)
            ORDER BY o.data_indicacao DESC, o.created_at DESC
            "#
        );
        let oportunidades = sqlx::query_as::<_, OportunidadeDetalhada>(&sql)
            .bind(inicio)
            .bind(fim)
            .bind(status)
            .fetch_all(executor)
            .await?;

        Ok(oportunidades)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        dados: &NovaOportunidade,
    ) -> Result<Option<Oportunidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE oportunidades
            SET empresa_origem_id = $2, empresa_destino_id = $3, status = $4, valor = $5,
                data_indicacao = $6, data_fechamento = $7, observacoes = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUNAS}
            "#
        );

        let oportunidade = sqlx::query_as::<_, Oportunidade>(&sql)
            .bind(id)
            .bind(dados.empresa_origem_id)
            .bind(dados.empresa_destino_id)
            .bind(dados.status)
            .bind(dados.valor)
            .bind(dados.data_indicacao)
            .bind(dados.data_fechamento)
            .bind(dados.observacoes.as_deref())
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::from_foreign_key(e, "empresa de origem ou destino inexistente"))?;

        Ok(oportunidade)
    }

    /// Muda só o status. Desfecho (ganho/perdido) sem data de fechamento recebe `hoje`,
    /// nunca antes da data de indicação.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusOportunidade,
        hoje: NaiveDate,
    ) -> Result<Option<Oportunidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE oportunidades
            SET status = $2,
                data_fechamento = CASE
                    WHEN $3 THEN COALESCE(data_fechamento, GREATEST($4::date, data_indicacao))
                    ELSE data_fechamento
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUNAS}
            "#
        );
        let oportunidade = sqlx::query_as::<_, Oportunidade>(&sql)
            .bind(id)
            .bind(status)
            .bind(!status.em_andamento())
            .bind(hoje)
            .fetch_optional(executor)
            .await?;

        Ok(oportunidade)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM oportunidades WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
