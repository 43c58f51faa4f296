// src/handlers/assets.rs

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    asset_cache::{Ack, AssetCache, MensagemCache},
    config::AppState,
};

const PREFIXO_APP: &str = "/app";

// "/app/css/a.css?v=2" -> "/css/a.css?v=2"; "/app" -> "/"
pub(crate) fn caminho_do_asset(uri: &Uri) -> String {
    let caminho = uri.path().strip_prefix(PREFIXO_APP).unwrap_or(uri.path());
    let caminho = if caminho.is_empty() { "/" } else { caminho };
    match uri.query() {
        Some(query) => format!("{}?{}", caminho, query),
        None => caminho.to_string(),
    }
}

fn gateway_desligado() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Gateway de assets não configurado (ASSET_ORIGIN)." })),
    )
        .into_response()
}

fn cache(app_state: &AppState) -> Option<Arc<AssetCache>> {
    app_state.asset_cache.clone()
}

// ANY /app/{*path}
pub async fn serve_asset(
    State(app_state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(cache) = cache(&app_state) else {
        return gateway_desligado();
    };

    let caminho = caminho_do_asset(&uri);
    cache.fetch(method, &caminho, &headers, body).await.into_response()
}

// POST /api/assets/messages
#[utoipa::path(
    post,
    path = "/api/assets/messages",
    tag = "Assets",
    request_body = MensagemCache,
    responses(
        (status = 200, description = "Mensagem processada", body = Ack),
        (status = 404, description = "Gateway desligado")
    )
)]
pub async fn post_message(
    State(app_state): State<AppState>,
    Json(mensagem): Json<MensagemCache>,
) -> Response {
    let Some(cache) = cache(&app_state) else {
        return gateway_desligado();
    };

    let ack = cache.handle_message(&mensagem).await;
    (StatusCode::OK, Json(ack)).into_response()
}

// POST /api/assets/sync/{tag}
#[utoipa::path(
    post,
    path = "/api/assets/sync/{tag}",
    tag = "Assets",
    params(("tag" = String, Path, description = "Tag do evento de sincronização")),
    responses(
        (status = 200, description = "Tag reconhecida ou não", body = Ack),
        (status = 404, description = "Gateway desligado")
    )
)]
pub async fn post_sync(
    State(app_state): State<AppState>,
    Path(tag): Path<String>,
) -> Response {
    let Some(cache) = cache(&app_state) else {
        return gateway_desligado();
    };

    let success = cache.sync(&tag);
    (
        StatusCode::OK,
        Json(Ack {
            success,
            removidos: Vec::new(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_o_prefixo_e_preserva_a_query() {
        let uri: Uri = "/app/css/site.css?v=2".parse().unwrap();
        assert_eq!(caminho_do_asset(&uri), "/css/site.css?v=2");

        let uri: Uri = "/app".parse().unwrap();
        assert_eq!(caminho_do_asset(&uri), "/");

        let uri: Uri = "/app/".parse().unwrap();
        assert_eq!(caminho_do_asset(&uri), "/");
    }
}
