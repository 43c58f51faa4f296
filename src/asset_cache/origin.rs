// src/asset_cache/origin.rs

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::{body::Bytes, http::Method};
use reqwest::{Client, Url};

use super::RespostaAsset;

#[derive(Debug, thiserror::Error)]
#[error("origem inacessível: {0}")]
pub struct OrigemIndisponivel(pub String);

/// De onde vêm os assets quando o cache não resolve.
#[async_trait]
pub trait Origin: Send + Sync {
    async fn buscar(&self, metodo: Method, caminho: &str, corpo: Bytes) -> Result<RespostaAsset, OrigemIndisponivel>;
}

pub struct HttpOrigin {
    client: Client,
    base: Url,
}

impl HttpOrigin {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("ASSET_ORIGIN inválida: {}", base))?;
        // Sem a barra final, `join` troca o último segmento em vez de anexar
        if !base.path().ends_with('/') {
            let caminho = format!("{}/", base.path());
            base.set_path(&caminho);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Falha ao criar o cliente HTTP da origem de assets")?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn buscar(&self, metodo: Method, caminho: &str, corpo: Bytes) -> Result<RespostaAsset, OrigemIndisponivel> {
        let url = self
            .base
            .join(caminho.trim_start_matches('/'))
            .map_err(|e| OrigemIndisponivel(format!("caminho inválido '{}': {}", caminho, e)))?;

        let resposta = self
            .client
            .request(metodo, url)
            .body(corpo)
            .send()
            .await
            .map_err(|e| OrigemIndisponivel(e.to_string()))?;

        let status = resposta.status().as_u16();
        let content_type = resposta
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let corpo = resposta
            .bytes()
            .await
            .map_err(|e| OrigemIndisponivel(e.to_string()))?;

        Ok(RespostaAsset {
            status,
            content_type,
            corpo,
        })
    }
}
