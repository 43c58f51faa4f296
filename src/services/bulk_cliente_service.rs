// src/services/bulk_cliente_service.rs
//
// Cadastro de clientes em lote a partir de uma lista de nomes.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EmpresaRepository,
    models::empresa::{
        BulkClientesResumo, BulkProgresso, Empresa, ItemBulkResultado, ResultadoBulk, StatusEmpresa,
        TipoEmpresa,
    },
    services::empresa_service::validar_vinculo,
};

/// O que o processamento em lote precisa do armazenamento.
#[async_trait]
pub trait ClienteStore: Send + Sync {
    async fn buscar_empresa(&self, id: Uuid) -> Result<Option<Empresa>, AppError>;

    /// Busca sem diferenciar maiúsculas/minúsculas
    async fn buscar_por_nome(&self, nome: &str) -> Result<Option<Empresa>, AppError>;

    async fn vinculo_existe(&self, proprietaria_id: Uuid, cliente_id: Uuid) -> Result<bool, AppError>;

    async fn vincular(&self, proprietaria_id: Uuid, cliente_id: Uuid) -> Result<(), AppError>;

    /// Cria a empresa cliente e o vínculo numa única transação
    async fn criar_cliente_vinculado(&self, proprietaria_id: Uuid, nome: &str) -> Result<Empresa, AppError>;
}

#[async_trait]
impl ClienteStore for EmpresaRepository {
    async fn buscar_empresa(&self, id: Uuid) -> Result<Option<Empresa>, AppError> {
        self.find_by_id(self.pool(), id).await
    }

    async fn buscar_por_nome(&self, nome: &str) -> Result<Option<Empresa>, AppError> {
        self.find_by_nome(self.pool(), nome).await
    }

    async fn vinculo_existe(&self, proprietaria_id: Uuid, cliente_id: Uuid) -> Result<bool, AppError> {
        self.vinculo_exists(self.pool(), proprietaria_id, cliente_id).await
    }

    async fn vincular(&self, proprietaria_id: Uuid, cliente_id: Uuid) -> Result<(), AppError> {
        self.create_vinculo(self.pool(), proprietaria_id, cliente_id).await?;
        Ok(())
    }

    async fn criar_cliente_vinculado(&self, proprietaria_id: Uuid, nome: &str) -> Result<Empresa, AppError> {
        let mut tx = self.pool().begin().await?;

        let cliente = self
            .create_empresa(&mut *tx, nome, TipoEmpresa::Cliente, StatusEmpresa::Ativo, None)
            .await?;
        self.create_vinculo(&mut *tx, proprietaria_id, cliente.id).await?;

        tx.commit().await?;
        Ok(cliente)
    }
}

#[derive(Clone)]
pub struct BulkClienteService<S> {
    store: Arc<S>,
}

impl<S: ClienteStore> BulkClienteService<S> {
    pub fn new(store: S) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Processa os nomes um a um, na ordem recebida.
    ///
    /// Falha em um item vira `erro` no resultado e o lote continua.
    /// `on_progress` é chamado depois de cada item.
    pub async fn processar_clientes<F>(
        &self,
        proprietaria_id: Uuid,
        nomes: &[String],
        mut on_progress: F,
    ) -> Result<BulkClientesResumo, AppError>
    where
        F: FnMut(BulkProgresso) + Send,
    {
        let proprietaria = self
            .store
            .buscar_empresa(proprietaria_id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;
        if !proprietaria.tipo.pode_ter_clientes() {
            return Err(AppError::BusinessRule("Um cliente não pode ser dono de outro cliente.".into()));
        }

        let validos: Vec<&str> = nomes.iter().map(|n| n.trim()).filter(|n| !n.is_empty()).collect();
        let total = validos.len();
        let mut resumo = BulkClientesResumo::default();

        for (indice, nome) in validos.into_iter().enumerate() {
            let item = match self.processar_um(&proprietaria, nome).await {
                Ok((resultado, empresa_id)) => ItemBulkResultado {
                    nome: nome.to_string(),
                    resultado,
                    empresa_id: Some(empresa_id),
                    mensagem: None,
                },
                Err(e) => {
                    tracing::warn!("Falha no cliente '{}' do lote: {}", nome, e);
                    ItemBulkResultado {
                        nome: nome.to_string(),
                        resultado: ResultadoBulk::Erro,
                        empresa_id: None,
                        mensagem: Some(mensagem_item(&e)),
                    }
                }
            };

            match item.resultado {
                ResultadoBulk::Criado => resumo.total_criados += 1,
                ResultadoBulk::Vinculado => resumo.total_vinculados += 1,
                ResultadoBulk::Duplicado => resumo.total_duplicados += 1,
                ResultadoBulk::Erro => resumo.total_erros += 1,
            }
            resumo.resultados.push(item);

            let processados = indice + 1;
            on_progress(BulkProgresso {
                processados,
                total,
                percentual: processados as f64 / total as f64 * 100.0,
            });
        }

        tracing::info!(
            "Lote de clientes de '{}': {} criados, {} vinculados, {} duplicados, {} erros",
            proprietaria.nome,
            resumo.total_criados,
            resumo.total_vinculados,
            resumo.total_duplicados,
            resumo.total_erros
        );

        Ok(resumo)
    }

    async fn processar_um(&self, proprietaria: &Empresa, nome: &str) -> Result<(ResultadoBulk, Uuid), AppError> {
        match self.store.buscar_por_nome(nome).await? {
            Some(existente) => {
                if self.store.vinculo_existe(proprietaria.id, existente.id).await? {
                    return Ok((ResultadoBulk::Duplicado, existente.id));
                }
                validar_vinculo(proprietaria, &existente)?;
                self.store.vincular(proprietaria.id, existente.id).await?;
                Ok((ResultadoBulk::Vinculado, existente.id))
            }
            None => {
                let criado = self.store.criar_cliente_vinculado(proprietaria.id, nome).await?;
                Ok((ResultadoBulk::Criado, criado.id))
            }
        }
    }
}

// Mensagem de negócio vai como está; falha de infraestrutura não vaza detalhe
fn mensagem_item(e: &AppError) -> String {
    match e {
        AppError::BusinessRule(m) | AppError::UniqueConstraintViolation(m) | AppError::InvalidInput(m) => m.clone(),
        AppError::DatabaseError(_) | AppError::InternalServerError(_) => "falha ao gravar o cliente".to_string(),
        outro => outro.to_string(),
    }
}
