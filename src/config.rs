// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    asset_cache::{origin::HttpOrigin, AssetCache, AssetCacheConfig},
    db::{EmpresaRepository, MetaRepository, OportunidadeRepository, WishlistRepository},
    services::{
        bulk_cliente_service::BulkClienteService,
        dashboard_service::DashboardService,
        empresa_service::EmpresaService,
        llm_client::{OpenAiRanking, RankingProvider},
        meta_service::MetaService,
        oportunidade_service::OportunidadeService,
        suggestion_service::SuggestionService,
        wishlist_service::WishlistService,
    },
};

// Flags da sincronização wishlist -> oportunidade
#[derive(Debug, Clone)]
pub struct WishlistSyncConfig {
    // Liga/desliga a criação automática
    pub auto_create_opp: bool,
    // Só cria quando a fase chega em "apresentado"
    pub create_on_presented: bool,
    // Registros criados antes desta data não disparam a criação
    pub start_at: Option<DateTime<Utc>>,
}

impl Default for WishlistSyncConfig {
    fn default() -> Self {
        Self {
            auto_create_opp: true,
            create_on_presented: true,
            start_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Configuração lida uma única vez na inicialização.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub wishlist: WishlistSyncConfig,
    // Sem chave, as sugestões usam só a heurística
    pub llm: Option<LlmConfig>,
    pub assets: AssetCacheConfig,
    // Sem origem, a rota /app fica desligada
    pub asset_origin: Option<String>,
}

impl HubConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave/valor (env nos binários, mapa nos testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let defaults = WishlistSyncConfig::default();
        let start_at = match lookup("WISHLIST_AUTO_CREATE_START_AT").filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw.trim())
                    .with_context(|| format!("WISHLIST_AUTO_CREATE_START_AT inválida: {}", raw))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        let wishlist = WishlistSyncConfig {
            auto_create_opp: parse_bool(lookup("WISHLIST_AUTO_CREATE_OPP"), defaults.auto_create_opp)?,
            create_on_presented: parse_bool(
                lookup("WISHLIST_CREATE_ON_PRESENTED"),
                defaults.create_on_presented,
            )?,
            start_at,
        };

        let llm = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| -> anyhow::Result<LlmConfig> {
                let base_url = lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
                validar_url("OPENAI_BASE_URL", &base_url)?;
                Ok(LlmConfig {
                    api_key,
                    base_url: base_url.trim_end_matches('/').to_string(),
                    model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                })
            })
            .transpose()?;

        let asset_origin = lookup("ASSET_ORIGIN").filter(|s| !s.trim().is_empty());
        if let Some(origin) = &asset_origin {
            validar_url("ASSET_ORIGIN", origin)?;
        }

        let mut assets = AssetCacheConfig::default();
        if let Some(prefix) = lookup("ASSET_CACHE_PREFIX") {
            assets.prefix = prefix;
        }
        if let Some(version) = lookup("ASSET_CACHE_VERSION") {
            assets.version = version;
        }
        if let Some(offline) = lookup("ASSET_OFFLINE_PAGE") {
            assets.offline_page = offline;
        }
        if let Some(raw) = lookup("ASSET_CACHE_MAX_ENTRIES").filter(|s| !s.trim().is_empty()) {
            assets.max_entries = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("ASSET_CACHE_MAX_ENTRIES inválido: {}", raw))?;
        }
        if let Some(lista) = lookup("ASSET_PRECACHE") {
            assets.precache = lista
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(Self {
            database_url,
            bind_addr,
            wishlist,
            llm,
            assets,
            asset_origin,
        })
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("1") | Some("true") | Some("TRUE") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("FALSE") | Some("off") => Ok(false),
        Some(outro) => anyhow::bail!("valor booleano inválido: {}", outro),
    }
}

fn validar_url(nome: &str, valor: &str) -> anyhow::Result<()> {
    reqwest::Url::parse(valor).with_context(|| format!("{} não é uma URL válida: {}", nome, valor))?;
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub empresa_service: EmpresaService,
    pub bulk_cliente_service: BulkClienteService<EmpresaRepository>,
    pub oportunidade_service: OportunidadeService,
    pub wishlist_service: WishlistService,
    pub meta_service: MetaService,
    pub dashboard_service: DashboardService,
    pub suggestion_service: SuggestionService,
    pub asset_cache: Option<Arc<AssetCache>>,
}

impl AppState {
    pub async fn new(config: HubConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, config: HubConfig) -> anyhow::Result<Self> {
        let empresa_repo = EmpresaRepository::new(db_pool.clone());
        let oportunidade_repo = OportunidadeRepository::new(db_pool.clone());
        let wishlist_repo = WishlistRepository::new(db_pool.clone());
        let meta_repo = MetaRepository::new(db_pool.clone());

        let empresa_service = EmpresaService::new(empresa_repo.clone());
        let bulk_cliente_service = BulkClienteService::new(empresa_repo.clone());
        let oportunidade_service =
            OportunidadeService::new(oportunidade_repo.clone(), wishlist_repo.clone());
        let wishlist_service =
            WishlistService::new(wishlist_repo, oportunidade_repo.clone(), config.wishlist.clone());
        let meta_service = MetaService::new(meta_repo, oportunidade_repo.clone());
        let dashboard_service = DashboardService::new(oportunidade_repo.clone(), empresa_repo.clone());

        let ranking: Option<Arc<dyn RankingProvider>> = match &config.llm {
            Some(llm) => Some(Arc::new(OpenAiRanking::new(llm.clone())?)),
            None => {
                tracing::info!("OPENAI_API_KEY ausente: sugestões usarão apenas a heurística.");
                None
            }
        };
        let suggestion_service = SuggestionService::new(oportunidade_repo, empresa_repo, ranking);

        let asset_cache = match &config.asset_origin {
            Some(origin) => {
                let cache = AssetCache::new(config.assets.clone(), Arc::new(HttpOrigin::new(origin)?));
                Some(Arc::new(cache))
            }
            None => None,
        };

        Ok(Self {
            db_pool,
            empresa_service,
            bulk_cliente_service,
            oportunidade_service,
            wishlist_service,
            meta_service,
            dashboard_service,
            suggestion_service,
            asset_cache,
        })
    }
}
