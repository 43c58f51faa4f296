// src/db/empresa_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::SinaisParceiro,
        empresa::{ClienteVinculado, Empresa, EmpresaCliente, StatusEmpresa, TipoEmpresa},
        sugestao::CandidatoParceiro,
    },
};

#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  EMPRESAS
    // =========================================================================

    pub async fn create_empresa<'e, E>(
        &self,
        executor: E,
        nome: &str,
        tipo: TipoEmpresa,
        status: StatusEmpresa,
        descricao: Option<&str>,
    ) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            r#"
            INSERT INTO empresas (nome, tipo, status, descricao)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nome, tipo, status, descricao, created_at
            "#,
        )
        .bind(nome)
        .bind(tipo)
        .bind(status)
        .bind(descricao)
        .fetch_one(executor)
        .await?;

        Ok(empresa)
    }

    pub async fn list_empresas<'e, E>(
        &self,
        executor: E,
        tipo: Option<TipoEmpresa>,
    ) -> Result<Vec<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresas = sqlx::query_as::<_, Empresa>(
            r#"
            SELECT id, nome, tipo, status, descricao, created_at
            FROM empresas
            WHERE ($1::tipo_empresa IS NULL OR tipo = $1)
            ORDER BY nome ASC
            "#,
        )
        .bind(tipo)
        .fetch_all(executor)
        .await?;

        Ok(empresas)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            "SELECT id, nome, tipo, status, descricao, created_at FROM empresas WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(empresa)
    }

    /// Mesma busca, travando a linha até o fim da transação
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            "SELECT id, nome, tipo, status, descricao, created_at FROM empresas WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(empresa)
    }

    /// Busca por nome ignorando maiúsculas/minúsculas e espaços nas pontas
    pub async fn find_by_nome<'e, E>(&self, executor: E, nome: &str) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            r#"
            SELECT id, nome, tipo, status, descricao, created_at
            FROM empresas
            WHERE LOWER(TRIM(nome)) = LOWER(TRIM($1))
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(nome)
        .fetch_optional(executor)
        .await?;

        Ok(empresa)
    }

    pub async fn update_empresa<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: &str,
        tipo: TipoEmpresa,
        status: StatusEmpresa,
        descricao: Option<&str>,
    ) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            r#"
            UPDATE empresas
            SET nome = $2, tipo = $3, status = $4, descricao = $5
            WHERE id = $1
            RETURNING id, nome, tipo, status, descricao, created_at
            "#,
        )
        .bind(id)
        .bind(nome)
        .bind(tipo)
        .bind(status)
        .bind(descricao)
        .fetch_optional(executor)
        .await?;

        Ok(empresa)
    }

    pub async fn delete_empresa<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  VÍNCULOS DE CLIENTES
    // =========================================================================

    pub async fn create_vinculo<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
        cliente_id: Uuid,
    ) -> Result<EmpresaCliente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EmpresaCliente>(
            r#"
            INSERT INTO empresa_clientes (empresa_proprietaria_id, empresa_cliente_id)
            VALUES ($1, $2)
            RETURNING id, empresa_proprietaria_id, empresa_cliente_id, data_relacionamento
            "#,
        )
        .bind(proprietaria_id)
        .bind(cliente_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "Este cliente já está vinculado à empresa."))
    }

    pub async fn vinculo_exists<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
        cliente_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existe: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM empresa_clientes
                WHERE empresa_proprietaria_id = $1 AND empresa_cliente_id = $2
            )
            "#,
        )
        .bind(proprietaria_id)
        .bind(cliente_id)
        .fetch_one(executor)
        .await?;

        Ok(existe)
    }

    /// A empresa é dona de pelo menos um cliente
    pub async fn possui_clientes<'e, E>(&self, executor: E, proprietaria_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existe: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM empresa_clientes WHERE empresa_proprietaria_id = $1)",
        )
        .bind(proprietaria_id)
        .fetch_one(executor)
        .await?;

        Ok(existe)
    }

    /// A empresa aparece como cliente de alguém
    pub async fn e_cliente_vinculado<'e, E>(&self, executor: E, cliente_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existe: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM empresa_clientes WHERE empresa_cliente_id = $1)",
        )
        .bind(cliente_id)
        .fetch_one(executor)
        .await?;

        Ok(existe)
    }

    pub async fn list_clientes<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
    ) -> Result<Vec<ClienteVinculado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clientes = sqlx::query_as::<_, ClienteVinculado>(
            r#"
            SELECT e.id, e.nome, e.tipo, e.status, e.descricao, e.created_at, ec.data_relacionamento
            FROM empresa_clientes ec
            INNER JOIN empresas e ON e.id = ec.empresa_cliente_id
            WHERE ec.empresa_proprietaria_id = $1
            ORDER BY e.nome ASC
            "#,
        )
        .bind(proprietaria_id)
        .fetch_all(executor)
        .await?;

        Ok(clientes)
    }

    pub async fn delete_vinculo<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
        cliente_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM empresa_clientes WHERE empresa_proprietaria_id = $1 AND empresa_cliente_id = $2",
        )
        .bind(proprietaria_id)
        .bind(cliente_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PARCEIROS (sugestões e relevância)
    // =========================================================================

    /// Parceiros ativos com o histórico de indicações feitas por eles
    pub async fn list_candidatos<'e, E>(
        &self,
        executor: E,
        excluir: &[Uuid],
    ) -> Result<Vec<CandidatoParceiro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let candidatos = sqlx::query_as::<_, CandidatoParceiro>(
            r#"
            SELECT
                e.id AS empresa_id,
                e.nome,
                e.descricao,
                COUNT(o.id) AS indicacoes,
                COUNT(o.id) FILTER (WHERE o.status = 'ganho') AS ganhas,
                AVG(o.valor) AS valor_medio
            FROM empresas e
            LEFT JOIN oportunidades o ON o.empresa_origem_id = e.id
            WHERE e.tipo = 'parceiro'
              AND e.status = 'ativo'
              AND NOT (e.id = ANY($1))
            GROUP BY e.id, e.nome, e.descricao
            ORDER BY e.nome ASC
            "#,
        )
        .bind(excluir)
        .fetch_all(executor)
        .await?;

        Ok(candidatos)
    }

    pub async fn sinais_relevancia<'e, E>(
        &self,
        executor: E,
        hoje: NaiveDate,
    ) -> Result<Vec<SinaisParceiro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, SinaisRow>(
            r#"
            SELECT
                e.id AS empresa_id,
                e.nome,
                (SELECT COUNT(*) FROM empresa_clientes ec
                  WHERE ec.empresa_proprietaria_id = e.id) AS total_clientes,
                (SELECT COUNT(DISTINCT ec.empresa_cliente_id) FROM empresa_clientes ec
                  INNER JOIN wishlist_items w ON w.empresa_desejada_id = ec.empresa_cliente_id
                  WHERE ec.empresa_proprietaria_id = e.id) AS clientes_desejados,
                (SELECT COUNT(*) FROM empresa_clientes ec
                  WHERE ec.empresa_proprietaria_id = e.id
                    AND ec.data_relacionamento >= ($1::date - 30)) AS clientes_novos,
                (SELECT COUNT(*) FROM wishlist_apresentacoes a
                  WHERE a.empresa_facilitadora_id = e.id) AS apresentacoes,
                (SELECT COUNT(*) FROM oportunidades o
                  WHERE o.empresa_origem_id = e.id) AS oportunidades,
                (SELECT COUNT(*) FROM oportunidades o
                  WHERE o.empresa_origem_id = e.id AND o.status = 'ganho') AS oportunidades_ganhas,
                (SELECT COUNT(*) FROM wishlist_items w
                  WHERE w.empresa_proprietaria_id = e.id) AS wishlist_total,
                (SELECT COUNT(*) FROM wishlist_items w
                  WHERE w.empresa_proprietaria_id = e.id
                    AND w.status IN ('aprovado', 'convertido')) AS wishlist_aprovados,
                GREATEST(
                    (SELECT MAX(o.data_indicacao) FROM oportunidades o
                      WHERE o.empresa_origem_id = e.id OR o.empresa_destino_id = e.id),
                    (SELECT MAX(a.data_apresentacao) FROM wishlist_apresentacoes a
                      WHERE a.empresa_facilitadora_id = e.id)
                ) AS ultima_interacao
            FROM empresas e
            WHERE e.tipo = 'parceiro' AND e.status = 'ativo'
            "#,
        )
        .bind(hoje)
        .fetch_all(executor)
        .await?;

        Ok(linhas.into_iter().map(SinaisParceiro::from).collect())
    }
}

// Contagens chegam como BIGINT
#[derive(sqlx::FromRow)]
struct SinaisRow {
    empresa_id: Uuid,
    nome: String,
    total_clientes: i64,
    clientes_desejados: i64,
    clientes_novos: i64,
    apresentacoes: i64,
    oportunidades: i64,
    oportunidades_ganhas: i64,
    wishlist_total: i64,
    wishlist_aprovados: i64,
    ultima_interacao: Option<NaiveDate>,
}

impl From<SinaisRow> for SinaisParceiro {
    fn from(r: SinaisRow) -> Self {
        let n = |v: i64| usize::try_from(v).unwrap_or(0);
        SinaisParceiro {
            empresa_id: r.empresa_id,
            nome: r.nome,
            total_clientes: n(r.total_clientes),
            clientes_desejados: n(r.clientes_desejados),
            clientes_novos: n(r.clientes_novos),
            apresentacoes: n(r.apresentacoes),
            oportunidades: n(r.oportunidades),
            oportunidades_ganhas: n(r.oportunidades_ganhas),
            wishlist_total: n(r.wishlist_total),
            wishlist_aprovados: n(r.wishlist_aprovados),
            ultima_interacao: r.ultima_interacao,
        }
    }
}
