// src/services/empresa_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EmpresaRepository,
    models::empresa::{ClienteVinculado, Empresa, EmpresaCliente, StatusEmpresa, TipoEmpresa},
};

#[derive(Clone)]
pub struct EmpresaService {
    repo: EmpresaRepository,
}

impl EmpresaService {
    pub fn new(repo: EmpresaRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  1. EMPRESAS
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
        let nome = nome_obrigatorio(nome)?;
        let empresa = self.repo.create_empresa(executor, nome, tipo, status, descricao).await?;
        tracing::info!("Empresa criada: {} ({:?})", empresa.nome, empresa.tipo);
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
        self.repo.list_empresas(executor, tipo).await
    }

    pub async fn get_empresa<'e, E>(&self, executor: E, id: Uuid) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    /// Troca de tipo não pode quebrar os vínculos existentes: dono de clientes não vira
    /// `cliente` e cliente vinculado não deixa de ser `cliente`.
    pub async fn update_empresa<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: &str,
        tipo: TipoEmpresa,
        status: StatusEmpresa,
        descricao: Option<&str>,
    ) -> Result<Empresa, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let nome = nome_obrigatorio(nome)?;
        let mut tx = executor.begin().await?;

        let atual = self
            .repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        if atual.tipo != tipo {
            let possui_clientes = self.repo.possui_clientes(&mut *tx, id).await?;
            let e_cliente = self.repo.e_cliente_vinculado(&mut *tx, id).await?;
            validar_mudanca_tipo(&atual, tipo, possui_clientes, e_cliente)?;
        }

        let empresa = self
            .repo
            .update_empresa(&mut *tx, id, nome, tipo, status, descricao)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        tx.commit().await?;
        Ok(empresa)
    }

    pub async fn delete_empresa<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_empresa(executor, id).await {
            Ok(0) => Err(AppError::NotFound("Empresa")),
            Ok(_) => Ok(()),
            // Empresa ainda referenciada por oportunidades/wishlist
            Err(AppError::DatabaseError(e)) => Err(AppError::from_foreign_key(
                e,
                "A empresa possui oportunidades ou wishlist associadas.",
            )),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    //  2. CLIENTES DE UMA EMPRESA
    // =========================================================================

    pub async fn vincular_cliente<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
        cliente_id: Uuid,
    ) -> Result<EmpresaCliente, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // As duas linhas ficam travadas: o tipo não muda entre a checagem e o insert
        let proprietaria = self
            .repo
            .lock_by_id(&mut *tx, proprietaria_id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;
        let cliente = self
            .repo
            .lock_by_id(&mut *tx, cliente_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        validar_vinculo(&proprietaria, &cliente)?;

        let vinculo = self.repo.create_vinculo(&mut *tx, proprietaria_id, cliente_id).await?;
        tx.commit().await?;

        Ok(vinculo)
    }

    pub async fn list_clientes<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
    ) -> Result<Vec<ClienteVinculado>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        if self.repo.find_by_id(&mut *conn, proprietaria_id).await?.is_none() {
            return Err(AppError::NotFound("Empresa"));
        }
        self.repo.list_clientes(&mut *conn, proprietaria_id).await
    }

    pub async fn desvincular_cliente<'e, E>(
        &self,
        executor: E,
        proprietaria_id: Uuid,
        cliente_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete_vinculo(executor, proprietaria_id, cliente_id).await? {
            0 => Err(AppError::NotFound("Vínculo")),
            _ => Ok(()),
        }
    }
}

fn nome_obrigatorio(nome: &str) -> Result<&str, AppError> {
    let nome = nome.trim();
    if nome.is_empty() {
        return Err(AppError::InvalidInput("nome é obrigatório".into()));
    }
    Ok(nome)
}

/// Um cliente não pode ser dono de outro cliente; só `cliente` pode ser vinculado.
pub(crate) fn validar_vinculo(proprietaria: &Empresa, cliente: &Empresa) -> Result<(), AppError> {
    if proprietaria.id == cliente.id {
        return Err(AppError::BusinessRule("Uma empresa não pode ser cliente de si mesma.".into()));
    }
    if !proprietaria.tipo.pode_ter_clientes() {
        return Err(AppError::BusinessRule("Um cliente não pode ser dono de outro cliente.".into()));
    }
    if cliente.tipo != TipoEmpresa::Cliente {
        return Err(AppError::BusinessRule(format!(
            "'{}' não é do tipo cliente.",
            cliente.nome
        )));
    }
    Ok(())
}

pub(crate) fn validar_mudanca_tipo(
    atual: &Empresa,
    novo_tipo: TipoEmpresa,
    possui_clientes: bool,
    e_cliente_vinculado: bool,
) -> Result<(), AppError> {
    if possui_clientes && !novo_tipo.pode_ter_clientes() {
        return Err(AppError::BusinessRule(format!(
            "'{}' possui clientes vinculados e não pode virar cliente.",
            atual.nome
        )));
    }
    if e_cliente_vinculado && novo_tipo != TipoEmpresa::Cliente {
        return Err(AppError::BusinessRule(format!(
            "'{}' está vinculada como cliente; desfaça o vínculo antes de mudar o tipo.",
            atual.nome
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::PgPool;

    fn empresa(nome: &str, tipo: TipoEmpresa) -> Empresa {
        Empresa {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            tipo,
            status: StatusEmpresa::Ativo,
            descricao: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parceiro_e_grupo_podem_ter_clientes() {
        let cliente = empresa("Cliente X", TipoEmpresa::Cliente);
        assert!(validar_vinculo(&empresa("Parceiro", TipoEmpresa::Parceiro), &cliente).is_ok());
        assert!(validar_vinculo(&empresa("Grupo", TipoEmpresa::Intragrupo), &cliente).is_ok());
    }

    #[test]
    fn cliente_nao_e_dono_de_cliente() {
        let err = validar_vinculo(
            &empresa("Cliente A", TipoEmpresa::Cliente),
            &empresa("Cliente B", TipoEmpresa::Cliente),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[test]
    fn so_vincula_empresas_do_tipo_cliente() {
        let err = validar_vinculo(
            &empresa("Grupo", TipoEmpresa::Intragrupo),
            &empresa("Outro parceiro", TipoEmpresa::Parceiro),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[test]
    fn nome_em_branco_e_rejeitado() {
        assert!(nome_obrigatorio("   ").is_err());
        assert_eq!(nome_obrigatorio("  Acme ").unwrap(), "Acme");
    }

    #[test]
    fn dono_de_clientes_so_muda_para_tipo_que_aceita_clientes() {
        let grupo = empresa("Grupo", TipoEmpresa::Intragrupo);
        let err = validar_mudanca_tipo(&grupo, TipoEmpresa::Cliente, true, false).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        assert!(validar_mudanca_tipo(&grupo, TipoEmpresa::Parceiro, true, false).is_ok());
    }

    #[test]
    fn cliente_vinculado_nao_deixa_de_ser_cliente() {
        let cliente = empresa("Cliente X", TipoEmpresa::Cliente);
        let err = validar_mudanca_tipo(&cliente, TipoEmpresa::Parceiro, false, true).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[test]
    fn sem_vinculos_qualquer_tipo_e_aceito() {
        let cliente = empresa("Cliente solto", TipoEmpresa::Cliente);
        assert!(validar_mudanca_tipo(&cliente, TipoEmpresa::Intragrupo, false, false).is_ok());
        let parceiro = empresa("Parceiro solto", TipoEmpresa::Parceiro);
        assert!(validar_mudanca_tipo(&parceiro, TipoEmpresa::Cliente, false, false).is_ok());
    }

    // ---- Banco de dados (`#[sqlx::test]` cria um banco novo com as migrações) ----

    async fn criar(service: &EmpresaService, pool: &PgPool, nome: &str, tipo: TipoEmpresa) -> Empresa {
        service
            .create_empresa(pool, nome, tipo, StatusEmpresa::Ativo, None)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn dono_com_clientes_nao_vira_cliente(pool: PgPool) {
        let service = EmpresaService::new(EmpresaRepository::new(pool.clone()));
        let grupo = criar(&service, &pool, "Grupo A&eight", TipoEmpresa::Intragrupo).await;
        let cliente = criar(&service, &pool, "Loja Azul", TipoEmpresa::Cliente).await;
        service.vincular_cliente(&pool, grupo.id, cliente.id).await.unwrap();

        let err = service
            .update_empresa(&pool, grupo.id, &grupo.nome, TipoEmpresa::Cliente, StatusEmpresa::Ativo, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        assert_eq!(service.get_empresa(&pool, grupo.id).await.unwrap().tipo, TipoEmpresa::Intragrupo);

        // continua podendo ter clientes, então a troca passa
        let atualizado = service
            .update_empresa(&pool, grupo.id, &grupo.nome, TipoEmpresa::Parceiro, StatusEmpresa::Ativo, None)
            .await
            .unwrap();
        assert_eq!(atualizado.tipo, TipoEmpresa::Parceiro);
    }

    #[sqlx::test]
    async fn cliente_vinculado_nao_muda_de_tipo(pool: PgPool) {
        let service = EmpresaService::new(EmpresaRepository::new(pool.clone()));
        let parceiro = criar(&service, &pool, "Parceiro Sul", TipoEmpresa::Parceiro).await;
        let cliente = criar(&service, &pool, "Mercado Central", TipoEmpresa::Cliente).await;
        service.vincular_cliente(&pool, parceiro.id, cliente.id).await.unwrap();

        let err = service
            .update_empresa(&pool, cliente.id, &cliente.nome, TipoEmpresa::Parceiro, StatusEmpresa::Ativo, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        // mesmo tipo: só os outros campos mudam
        let renomeado = service
            .update_empresa(&pool, cliente.id, "Mercado Central Ltda", TipoEmpresa::Cliente, StatusEmpresa::Inativo, None)
            .await
            .unwrap();
        assert_eq!(renomeado.nome, "Mercado Central Ltda");

        service.desvincular_cliente(&pool, parceiro.id, cliente.id).await.unwrap();
        let solto = service
            .update_empresa(&pool, cliente.id, &renomeado.nome, TipoEmpresa::Parceiro, StatusEmpresa::Ativo, None)
            .await
            .unwrap();
        assert_eq!(solto.tipo, TipoEmpresa::Parceiro);
    }

    #[sqlx::test]
    async fn cliente_como_dono_e_rejeitado_no_banco(pool: PgPool) {
        let service = EmpresaService::new(EmpresaRepository::new(pool.clone()));
        let dono = criar(&service, &pool, "Cliente Dono", TipoEmpresa::Cliente).await;
        let outro = criar(&service, &pool, "Cliente Outro", TipoEmpresa::Cliente).await;

        let err = service.vincular_cliente(&pool, dono.id, outro.id).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        assert!(service.list_clientes(&pool, dono.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn atualizar_empresa_inexistente_e_404(pool: PgPool) {
        let service = EmpresaService::new(EmpresaRepository::new(pool.clone()));
        let err = service
            .update_empresa(&pool, Uuid::new_v4(), "Fantasma", TipoEmpresa::Parceiro, StatusEmpresa::Ativo, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Empresa")));
    }
}
