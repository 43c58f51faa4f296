// src/services/suggestion_service.rs

use std::sync::Arc;

use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    analytics::compatibilidade::{pontuar_candidatos, PoliticaSugestao},
    common::error::AppError,
    db::{EmpresaRepository, OportunidadeRepository},
    models::{
        oportunidade::OportunidadeDetalhada,
        sugestao::{CandidatoParceiro, SugestaoResponse},
    },
    services::llm_client::RankingProvider,
};

#[derive(Clone)]
pub struct SuggestionService {
    oportunidade_repo: OportunidadeRepository,
    empresa_repo: EmpresaRepository,
    ranking: Option<Arc<dyn RankingProvider>>,
}

impl SuggestionService {
    pub fn new(
        oportunidade_repo: OportunidadeRepository,
        empresa_repo: EmpresaRepository,
        ranking: Option<Arc<dyn RankingProvider>>,
    ) -> Self {
        Self {
            oportunidade_repo,
            empresa_repo,
            ranking,
        }
    }

    pub async fn sugerir<'e, E>(&self, executor: E, oportunidade_id: Uuid) -> Result<SugestaoResponse, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let oportunidade = self
            .oportunidade_repo
            .find_detalhada(&mut *conn, oportunidade_id)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;

        // As duas pontas da oportunidade não são sugeridas para ela mesma
        let excluir = [
            oportunidade.oportunidade.empresa_origem_id,
            oportunidade.oportunidade.empresa_destino_id,
        ];
        let candidatos = self.empresa_repo.list_candidatos(&mut *conn, &excluir).await?;
        drop(conn);

        let ranking_ia = ranking_ia(self.ranking.as_deref(), &oportunidade, &candidatos).await;
        let sugestoes = pontuar_candidatos(
            oportunidade.oportunidade.valor,
            &candidatos,
            &ranking_ia,
            &PoliticaSugestao::V1,
        );

        Ok(SugestaoResponse {
            oportunidade_id,
            sugestoes,
            usou_ia: !ranking_ia.is_empty(),
        })
    }
}

// Falha do LLM nunca derruba a sugestão: cai para a heurística pura
async fn ranking_ia(
    provider: Option<&dyn RankingProvider>,
    oportunidade: &OportunidadeDetalhada,
    candidatos: &[CandidatoParceiro],
) -> Vec<Uuid> {
    let Some(provider) = provider else {
        return Vec::new();
    };
    if candidatos.is_empty() {
        return Vec::new();
    }

    match provider.ranquear(oportunidade, candidatos).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Ranking por IA indisponível, usando só a heurística: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        empresa::TipoEmpresa,
        oportunidade::{Oportunidade, StatusOportunidade},
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};

    struct Fixo(Vec<Uuid>);
    struct Quebrado;

    #[async_trait]
    impl RankingProvider for Fixo {
        async fn ranquear(&self, _: &OportunidadeDetalhada, _: &[CandidatoParceiro]) -> Result<Vec<Uuid>, AppError> {
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl RankingProvider for Quebrado {
        async fn ranquear(&self, _: &OportunidadeDetalhada, _: &[CandidatoParceiro]) -> Result<Vec<Uuid>, AppError> {
            Err(AppError::ExternalService("timeout".into()))
        }
    }

    fn oportunidade() -> OportunidadeDetalhada {
        OportunidadeDetalhada {
            oportunidade: Oportunidade {
                id: Uuid::new_v4(),
                empresa_origem_id: Uuid::new_v4(),
                empresa_destino_id: Uuid::new_v4(),
                status: StatusOportunidade::EmContato,
                valor: None,
                data_indicacao: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                data_fechamento: None,
                observacoes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            origem_nome: "Parceiro A".into(),
            origem_tipo: TipoEmpresa::Parceiro,
            destino_nome: "Grupo B".into(),
            destino_tipo: TipoEmpresa::Intragrupo,
        }
    }

    fn candidatos() -> Vec<CandidatoParceiro> {
        vec![CandidatoParceiro {
            empresa_id: Uuid::new_v4(),
            nome: "C".into(),
            descricao: None,
            indicacoes: 1,
            ganhas: 0,
            valor_medio: None,
        }]
    }

    #[tokio::test]
    async fn sem_provedor_nao_ha_ranking() {
        assert!(ranking_ia(None, &oportunidade(), &candidatos()).await.is_empty());
    }

    #[tokio::test]
    async fn usa_a_ordem_do_provedor() {
        let lista = candidatos();
        let provedor = Fixo(vec![lista[0].empresa_id]);
        let ids = ranking_ia(Some(&provedor), &oportunidade(), &lista).await;
        assert_eq!(ids, vec![lista[0].empresa_id]);
    }

    #[tokio::test]
    async fn falha_do_provedor_cai_para_a_heuristica() {
        assert!(ranking_ia(Some(&Quebrado), &oportunidade(), &candidatos()).await.is_empty());
    }
}
