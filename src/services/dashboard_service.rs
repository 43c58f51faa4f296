// src/services/dashboard_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Postgres};

use crate::{
    analytics::{
        parceiros::calcular_painel,
        recebimento::analisar_recebimento,
        relevancia::{ranquear, PoliticaRelevancia},
        resultados::calcular_resultados,
        tendencia::tendencia_semanal,
    },
    common::error::AppError,
    db::{EmpresaRepository, OportunidadeRepository},
    models::{
        dashboard::{
            FiltroPeriodo, PainelParceiros, RecebimentoEmpresa, RelevanciaParceiro, ResultadosStats,
            SemanaTendencia,
        },
        oportunidade::OportunidadeDetalhada,
    },
};

// Janela máxima da tendência
pub const MAX_SEMANAS: usize = 52;

#[derive(Clone)]
pub struct DashboardService {
    oportunidade_repo: OportunidadeRepository,
    empresa_repo: EmpresaRepository,
}

impl DashboardService {
    pub fn new(oportunidade_repo: OportunidadeRepository, empresa_repo: EmpresaRepository) -> Self {
        Self {
            oportunidade_repo,
            empresa_repo,
        }
    }

    // O filtro de datas vai para o SQL; os tipos são filtrados no cálculo
    async fn carregar<'e, E>(&self, executor: E, filtro: &FiltroPeriodo) -> Result<Vec<OportunidadeDetalhada>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if let (Some(inicio), Some(fim)) = (filtro.inicio, filtro.fim) {
            if inicio > fim {
                return Err(AppError::InvalidInput("inicio deve ser anterior a fim".into()));
            }
        }
        self.oportunidade_repo
            .list_detalhadas(executor, filtro.inicio, filtro.fim, None)
            .await
    }

    pub async fn resultados<'e, E>(&self, executor: E, filtro: FiltroPeriodo) -> Result<ResultadosStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let oportunidades = self.carregar(executor, &filtro).await?;
        Ok(calcular_resultados(&oportunidades, &filtro))
    }

    pub async fn parceiros<'e, E>(&self, executor: E, filtro: FiltroPeriodo) -> Result<PainelParceiros, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let oportunidades = self.carregar(executor, &filtro).await?;
        Ok(calcular_painel(&oportunidades, &filtro))
    }

    pub async fn recebimento<'e, E>(
        &self,
        executor: E,
        filtro: FiltroPeriodo,
    ) -> Result<Vec<RecebimentoEmpresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let oportunidades = self.carregar(executor, &filtro).await?;
        Ok(analisar_recebimento(&oportunidades, &filtro))
    }

    pub async fn tendencia<'e, E>(&self, executor: E, semanas: usize) -> Result<Vec<SemanaTendencia>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if semanas == 0 || semanas > MAX_SEMANAS {
            return Err(AppError::InvalidInput(format!("semanas deve estar entre 1 e {}", MAX_SEMANAS)));
        }

        let hoje = hoje();
        // Uma semana a mais cobre o início da semana mais antiga
        let inicio = hoje - chrono::Duration::weeks(semanas as i64 + 1);
        let oportunidades = self
            .oportunidade_repo
            .list_detalhadas(executor, Some(inicio), Some(hoje), None)
            .await?;

        Ok(tendencia_semanal(&oportunidades, semanas, hoje))
    }

    pub async fn relevancia<'e, E>(&self, executor: E) -> Result<Vec<RelevanciaParceiro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hoje = hoje();
        let sinais = self.empresa_repo.sinais_relevancia(executor, hoje).await?;
        Ok(ranquear(&sinais, &PoliticaRelevancia::V1, hoje))
    }
}

fn hoje() -> NaiveDate {
    Utc::now().date_naive()
}
