// src/db/meta_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::meta::{DadosMeta, Meta},
};

const COLUNAS: &str = "id, nome, descricao, tipo_meta, valor_meta, periodo, ano, mes, trimestre, \
                       segmento_grupo, status_oportunidade, empresa_id, ativo, created_at";

#[derive(Clone)]
pub struct MetaRepository {
    pool: PgPool,
}

impl MetaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create<'e, E>(&self, executor: E, dados: &DadosMeta) -> Result<Meta, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO metas (
                nome, descricao, tipo_meta, valor_meta, periodo, ano, mes, trimestre,
                segmento_grupo, status_oportunidade, empresa_id, ativo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUNAS}
            "#
        );

        let meta = sqlx::query_as::<_, Meta>(&sql)
            .bind(&dados.nome)
            .bind(dados.descricao.as_deref())
            .bind(dados.tipo_meta)
            .bind(dados.valor_meta)
            .bind(dados.periodo)
            .bind(dados.ano)
            .bind(dados.mes)
            .bind(dados.trimestre)
            .bind(dados.segmento_grupo)
            .bind(dados.status_oportunidade)
            .bind(dados.empresa_id)
            .bind(dados.ativo)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_foreign_key(e, "empresa da meta não existe"))?;

        Ok(meta)
    }

    pub async fn list<'e, E>(&self, executor: E, apenas_ativas: bool) -> Result<Vec<Meta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {COLUNAS} FROM metas WHERE (NOT $1 OR ativo) ORDER BY ano DESC, mes DESC NULLS LAST, trimestre DESC NULLS LAST, nome"
        );
        let metas = sqlx::query_as::<_, Meta>(&sql)
            .bind(apenas_ativas)
            .fetch_all(executor)
            .await?;

        Ok(metas)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Meta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COLUNAS} FROM metas WHERE id = $1");
        let meta = sqlx::query_as::<_, Meta>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(meta)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, dados: &DadosMeta) -> Result<Option<Meta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE metas
            SET nome = $2, descricao = $3, tipo_meta = $4, valor_meta = $5, periodo = $6, ano = $7,
                mes = $8, trimestre = $9, segmento_grupo = $10, status_oportunidade = $11,
                empresa_id = $12, ativo = $13
            WHERE id = $1
            RETURNING {COLUNAS}
            "#
        );

        let meta = sqlx::query_as::<_, Meta>(&sql)
            .bind(id)
            .bind(&dados.nome)
            .bind(dados.descricao.as_deref())
            .bind(dados.tipo_meta)
            .bind(dados.valor_meta)
            .bind(dados.periodo)
            .bind(dados.ano)
            .bind(dados.mes)
            .bind(dados.trimestre)
            .bind(dados.segmento_grupo)
            .bind(dados.status_oportunidade)
            .bind(dados.empresa_id)
            .bind(dados.ativo)
            .fetch_optional(executor)
            .await?;

        Ok(meta)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM metas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
