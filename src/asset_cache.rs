// src/asset_cache.rs
//
// Gateway de assets do app com suporte offline.
//
// Dois caches versionados (`<prefixo>-<versão>` e `<prefixo>-fallback-<versão>`).
// `install` popula os dois com a lista fixa, `activate` remove versões antigas e
// `fetch` aplica a estratégia de `policy`.

pub mod origin;
pub mod policy;
pub mod storage;

use std::{num::NonZeroUsize, sync::Arc};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use self::{
    origin::Origin,
    policy::{escolher, Estrategia},
    storage::CacheStorage,
};

#[derive(Debug, Clone)]
pub struct AssetCacheConfig {
    pub prefix: String,
    pub version: String,
    // Servida quando a navegação falha e o documento não está em cache
    pub offline_page: String,
    pub precache: Vec<String>,
    // Teto de entradas por cache nomeado; só o principal recebe gravações em tempo de uso
    pub max_entries: usize,
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            prefix: "aeight-hub".to_string(),
            version: "v1".to_string(),
            offline_page: "/offline.html".to_string(),
            precache: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/offline.html".to_string(),
                "/manifest.json".to_string(),
            ],
            max_entries: 500,
        }
    }
}

/// Resposta guardada em cache (ou vinda da origem).
#[derive(Debug, Clone, PartialEq)]
pub struct RespostaAsset {
    pub status: u16,
    pub content_type: Option<String>,
    pub corpo: Bytes,
}

impl RespostaAsset {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    // Resposta sintética quando nada mais resolve
    fn indisponivel() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            content_type: Some("text/plain; charset=utf-8".to_string()),
            corpo: Bytes::from_static(b"Offline - recurso indisponivel"),
        }
    }
}

// De onde saiu a resposta (vai no cabeçalho x-asset-source)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fonte {
    Rede,
    Cache,
    Fallback,
    Offline,
    Sintetica,
}

impl Fonte {
    fn as_str(self) -> &'static str {
        match self {
            Fonte::Rede => "network",
            Fonte::Cache => "cache",
            Fonte::Fallback => "fallback",
            Fonte::Offline => "offline-page",
            Fonte::Sintetica => "synthesized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetServido {
    pub resposta: RespostaAsset,
    pub fonte: Fonte,
}

impl IntoResponse for AssetServido {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.resposta.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = Response::new(Body::from(self.resposta.corpo));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        if let Some(ct) = self.resposta.content_type.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
            headers.insert(header::CONTENT_TYPE, ct);
        }
        headers.insert("x-asset-source", HeaderValue::from_static(self.fonte.as_str()));
        response
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct RelatorioInstalacao {
    pub cache: String,
    pub armazenados: Vec<String>,
    pub falhas: Vec<String>,
}

// Mensagens aceitas pelo gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMensagem {
    SkipWaiting,
    ClearCache,
    BackgroundSync,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MensagemCache {
    #[serde(rename = "type")]
    pub tipo: TipoMensagem,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removidos: Vec<String>,
}

pub const SYNC_TAG: &str = "background-sync";

pub struct AssetCache {
    config: AssetCacheConfig,
    storage: CacheStorage,
    origin: Arc<dyn Origin>,
}

impl AssetCache {
    pub fn new(config: AssetCacheConfig, origin: Arc<dyn Origin>) -> Self {
        let capacidade = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            storage: CacheStorage::new(capacidade),
            origin,
        }
    }

    pub fn primary_name(&self) -> String {
        format!("{}-{}", self.config.prefix, self.config.version)
    }

    pub fn fallback_name(&self) -> String {
        format!("{}-fallback-{}", self.config.prefix, self.config.version)
    }

    /// Baixa a lista fixa para os dois caches. Falha de um item só entra no relatório.
    pub async fn install(&self) -> RelatorioInstalacao {
        let primary = self.primary_name();
        let fallback = self.fallback_name();
        let mut relatorio = RelatorioInstalacao {
            cache: primary.clone(),
            ..Default::default()
        };

        for caminho in &self.config.precache {
            match self.origin.buscar(Method::GET, caminho, Bytes::new()).await {
                Ok(resposta) if resposta.ok() => {
                    self.storage.put(&primary, caminho, resposta.clone()).await;
                    self.storage.put(&fallback, caminho, resposta).await;
                    relatorio.armazenados.push(caminho.clone());
                }
                Ok(resposta) => {
                    tracing::warn!("Precache de '{}' ignorado: origem respondeu {}", caminho, resposta.status);
                    relatorio.falhas.push(caminho.clone());
                }
                Err(e) => {
                    tracing::warn!("Precache de '{}' falhou: {}", caminho, e);
                    relatorio.falhas.push(caminho.clone());
                }
            }
        }

        tracing::info!(
            "Cache de assets {} instalado: {} ok, {} falhas",
            primary,
            relatorio.armazenados.len(),
            relatorio.falhas.len()
        );
        relatorio
    }

    /// Remove todo cache que não seja um dos dois atuais. Retorna os removidos.
    pub async fn activate(&self) -> Vec<String> {
        let atuais = [self.primary_name(), self.fallback_name()];
        let mut removidos = Vec::new();

        for nome in self.storage.nomes().await {
            if !atuais.contains(&nome) && self.storage.delete(&nome).await {
                tracing::info!("Cache antigo removido: {}", nome);
                removidos.push(nome);
            }
        }
        removidos
    }

    pub async fn fetch(&self, metodo: Method, caminho: &str, headers: &HeaderMap, corpo: Bytes) -> AssetServido {
        match escolher(&metodo, headers) {
            Estrategia::PassThrough => self.pass_through(metodo, caminho, corpo).await,
            Estrategia::NetworkFirst => self.network_first(caminho).await,
            Estrategia::CacheFirst => self.cache_first(caminho).await,
        }
    }

    async fn pass_through(&self, metodo: Method, caminho: &str, corpo: Bytes) -> AssetServido {
        match self.origin.buscar(metodo, caminho, corpo).await {
            Ok(resposta) => AssetServido { resposta, fonte: Fonte::Rede },
            Err(e) => {
                tracing::warn!("Origem indisponível para '{}': {}", caminho, e);
                sintetica()
            }
        }
    }

    async fn network_first(&self, caminho: &str) -> AssetServido {
        let primary = self.primary_name();
        let fallback = self.fallback_name();

        match self.origin.buscar(Method::GET, caminho, Bytes::new()).await {
            Ok(resposta) => {
                if resposta.ok() {
                    self.storage.put(&primary, caminho, resposta.clone()).await;
                }
                return AssetServido { resposta, fonte: Fonte::Rede };
            }
            Err(e) => tracing::debug!("Navegação offline para '{}': {}", caminho, e),
        }

        let nomes = [primary.as_str(), fallback.as_str()];
        if let Some(resposta) = self.storage.get_any(&nomes, caminho).await {
            return AssetServido { resposta, fonte: Fonte::Cache };
        }
        if let Some(resposta) = self.storage.get_any(&nomes, &self.config.offline_page).await {
            return AssetServido { resposta, fonte: Fonte::Offline };
        }
        sintetica()
    }

    async fn cache_first(&self, caminho: &str) -> AssetServido {
        let primary = self.primary_name();

        if let Some(resposta) = self.storage.get(&primary, caminho).await {
            return AssetServido { resposta, fonte: Fonte::Cache };
        }

        match self.origin.buscar(Method::GET, caminho, Bytes::new()).await {
            Ok(resposta) => {
                if resposta.ok() {
                    self.storage.put(&primary, caminho, resposta.clone()).await;
                }
                return AssetServido { resposta, fonte: Fonte::Rede };
            }
            Err(e) => tracing::debug!("Asset '{}' fora do cache e origem indisponível: {}", caminho, e),
        }

        if let Some(resposta) = self.storage.get(&self.fallback_name(), caminho).await {
            return AssetServido { resposta, fonte: Fonte::Fallback };
        }
        sintetica()
    }

    pub async fn handle_message(&self, mensagem: &MensagemCache) -> Ack {
        match mensagem.tipo {
            // Sem ciclo de espera num gateway de servidor; só confirma
            TipoMensagem::SkipWaiting | TipoMensagem::BackgroundSync => Ack {
                success: true,
                removidos: Vec::new(),
            },
            TipoMensagem::ClearCache => {
                let mut removidos = Vec::new();
                for nome in self.storage.nomes().await {
                    if self.storage.delete(&nome).await {
                        removidos.push(nome);
                    }
                }
                tracing::info!("Caches de assets limpos: {:?}", removidos);
                Ack {
                    success: true,
                    removidos,
                }
            }
        }
    }

    /// Evento de sincronização. Só a tag `background-sync` é reconhecida; não há fila a reenviar.
    pub fn sync(&self, tag: &str) -> bool {
        let reconhecida = tag == SYNC_TAG;
        if !reconhecida {
            tracing::debug!("Tag de sync desconhecida: {}", tag);
        }
        reconhecida
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &CacheStorage {
        &self.storage
    }
}

fn sintetica() -> AssetServido {
    AssetServido {
        resposta: RespostaAsset::indisponivel(),
        fonte: Fonte::Sintetica,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_cache::origin::OrigemIndisponivel;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    // Origem em memória que pode "cair"
    #[derive(Default)]
    struct OrigemFake {
        arquivos: HashMap<String, &'static str>,
        offline: AtomicBool,
        chamadas: AtomicUsize,
    }

    impl OrigemFake {
        fn com(arquivos: &[(&str, &'static str)]) -> Self {
            Self {
                arquivos: arquivos.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Origin for OrigemFake {
        async fn buscar(&self, _: Method, caminho: &str, _: Bytes) -> Result<RespostaAsset, OrigemIndisponivel> {
            self.chamadas.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(OrigemIndisponivel("sem rede".into()));
            }
            Ok(match self.arquivos.get(caminho) {
                Some(conteudo) => RespostaAsset {
                    status: 200,
                    content_type: Some("text/plain".into()),
                    corpo: Bytes::from_static(conteudo.as_bytes()),
                },
                None => RespostaAsset {
                    status: 404,
                    content_type: None,
                    corpo: Bytes::new(),
                },
            })
        }
    }

    fn config() -> AssetCacheConfig {
        AssetCacheConfig {
            prefix: "hub".into(),
            version: "v2".into(),
            offline_page: "/offline.html".into(),
            precache: vec!["/".into(), "/offline.html".into(), "/app.js".into()],
            max_entries: 50,
        }
    }

    fn cache_com(origem: Arc<OrigemFake>) -> AssetCache {
        AssetCache::new(config(), origem)
    }

    fn navegacao() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers
    }

    #[test]
    fn nomes_dos_caches_seguem_a_versao() {
        let cache = cache_com(Arc::new(OrigemFake::default()));
        assert_eq!(cache.primary_name(), "hub-v2");
        assert_eq!(cache.fallback_name(), "hub-fallback-v2");
    }

    #[tokio::test]
    async fn install_popula_os_dois_caches_e_registra_falhas() {
        let origem = Arc::new(OrigemFake::com(&[("/", "home"), ("/offline.html", "offline")]));
        let cache = cache_com(origem);

        let relatorio = cache.install().await;
        assert_eq!(relatorio.armazenados, vec!["/", "/offline.html"]);
        assert_eq!(relatorio.falhas, vec!["/app.js"]);
        assert_eq!(cache.storage().len("hub-v2").await, 2);
        assert_eq!(cache.storage().len("hub-fallback-v2").await, 2);
    }

    #[tokio::test]
    async fn asset_em_cache_e_servido_offline() {
        let origem = Arc::new(OrigemFake::com(&[("/app.js", "js")]));
        let cache = cache_com(origem.clone());
        cache.install().await;

        origem.offline.store(true, Ordering::SeqCst);
        let servido = cache.fetch(Method::GET, "/app.js", &HeaderMap::new(), Bytes::new()).await;

        assert_eq!(servido.fonte, Fonte::Cache);
        assert_eq!(servido.resposta.status, 200);
        assert_eq!(&servido.resposta.corpo[..], b"js");
    }

    #[tokio::test]
    async fn cache_first_nao_vai_a_rede_quando_ha_cache() {
        let origem = Arc::new(OrigemFake::com(&[("/app.js", "js")]));
        let cache = cache_com(origem.clone());
        cache.install().await;
        let antes = origem.chamadas.load(Ordering::SeqCst);

        cache.fetch(Method::GET, "/app.js", &HeaderMap::new(), Bytes::new()).await;
        assert_eq!(origem.chamadas.load(Ordering::SeqCst), antes);
    }

    #[tokio::test]
    async fn asset_sem_cache_offline_vira_503() {
        let origem = Arc::new(OrigemFake::default());
        origem.offline.store(true, Ordering::SeqCst);
        let cache = cache_com(origem);

        let servido = cache.fetch(Method::GET, "/img/logo.png", &HeaderMap::new(), Bytes::new()).await;
        assert_eq!(servido.fonte, Fonte::Sintetica);
        assert_eq!(servido.resposta.status, 503);
    }

    #[tokio::test]
    async fn cache_first_usa_o_reserva_quando_o_principal_nao_tem() {
        let origem = Arc::new(OrigemFake::default());
        let cache = cache_com(origem.clone());
        let asset = RespostaAsset {
            status: 200,
            content_type: None,
            corpo: Bytes::from_static(b"reserva"),
        };
        cache.storage().put("hub-fallback-v2", "/app.css", asset).await;
        origem.offline.store(true, Ordering::SeqCst);

        let servido = cache.fetch(Method::GET, "/app.css", &HeaderMap::new(), Bytes::new()).await;
        assert_eq!(servido.fonte, Fonte::Fallback);
    }

    #[tokio::test]
    async fn navegacao_offline_cai_na_pagina_offline() {
        let origem = Arc::new(OrigemFake::com(&[("/offline.html", "offline")]));
        let cache = cache_com(origem.clone());
        cache.install().await;
        origem.offline.store(true, Ordering::SeqCst);

        let servido = cache.fetch(Method::GET, "/relatorios", &navegacao(), Bytes::new()).await;
        assert_eq!(servido.fonte, Fonte::Offline);
        assert_eq!(&servido.resposta.corpo[..], b"offline");
    }

    #[tokio::test]
    async fn navegacao_online_busca_na_rede_e_guarda() {
        let origem = Arc::new(OrigemFake::com(&[("/", "home")]));
        let cache = cache_com(origem.clone());

        let servido = cache.fetch(Method::GET, "/", &navegacao(), Bytes::new()).await;
        assert_eq!(servido.fonte, Fonte::Rede);
        assert!(cache.storage().get("hub-v2", "/").await.is_some());
    }

    #[tokio::test]
    async fn cache_principal_respeita_o_limite_e_o_reserva_sobrevive() {
        let origem = Arc::new(OrigemFake::com(&[
            ("/offline.html", "offline"),
            ("/a.js", "a"),
            ("/b.js", "b"),
            ("/c.js", "c"),
            ("/d.js", "d"),
        ]));
        let cache = AssetCache::new(
            AssetCacheConfig {
                precache: vec!["/offline.html".into()],
                max_entries: 2,
                ..config()
            },
            origem.clone(),
        );
        cache.install().await;

        for caminho in ["/a.js", "/b.js", "/c.js", "/d.js"] {
            let servido = cache.fetch(Method::GET, caminho, &HeaderMap::new(), Bytes::new()).await;
            assert_eq!(servido.fonte, Fonte::Rede);
        }
        assert_eq!(cache.storage().len("hub-v2").await, 2);
        assert!(cache.storage().get("hub-v2", "/a.js").await.is_none());
        assert!(cache.storage().get("hub-v2", "/d.js").await.is_some());

        // a página offline saiu do principal, mas continua no reserva
        origem.offline.store(true, Ordering::SeqCst);
        let servido = cache.fetch(Method::GET, "/qualquer", &navegacao(), Bytes::new()).await;
        assert_eq!(servido.fonte, Fonte::Offline);
        assert_eq!(&servido.resposta.corpo[..], b"offline");
    }

    #[tokio::test]
    async fn activate_remove_versoes_antigas() {
        let cache = cache_com(Arc::new(OrigemFake::default()));
        let asset = RespostaAsset {
            status: 200,
            content_type: None,
            corpo: Bytes::new(),
        };
        for nome in ["hub-v1", "hub-fallback-v1", "hub-v2", "hub-fallback-v2"] {
            cache.storage().put(nome, "/", asset.clone()).await;
        }

        let removidos = cache.activate().await;
        assert_eq!(removidos, vec!["hub-fallback-v1", "hub-v1"]);
        assert_eq!(cache.storage().nomes().await, vec!["hub-fallback-v2", "hub-v2"]);
    }

    #[tokio::test]
    async fn clear_cache_apaga_tudo_e_confirma() {
        let origem = Arc::new(OrigemFake::com(&[("/", "home")]));
        let cache = cache_com(origem);
        cache.install().await;

        let ack = cache
            .handle_message(&MensagemCache {
                tipo: TipoMensagem::ClearCache,
            })
            .await;
        assert!(ack.success);
        assert_eq!(ack.removidos.len(), 2);
        assert!(cache.storage().nomes().await.is_empty());
    }

    #[tokio::test]
    async fn demais_mensagens_so_confirmam() {
        let cache = cache_com(Arc::new(OrigemFake::default()));
        for tipo in [TipoMensagem::SkipWaiting, TipoMensagem::BackgroundSync] {
            assert!(cache.handle_message(&MensagemCache { tipo }).await.success);
        }
        assert!(cache.sync("background-sync"));
        assert!(!cache.sync("outra"));
    }

    #[test]
    fn mensagem_usa_o_formato_do_navegador() {
        let msg: MensagemCache = serde_json::from_str(r#"{"type":"CLEAR_CACHE"}"#).unwrap();
        assert_eq!(msg.tipo, TipoMensagem::ClearCache);
    }
}
