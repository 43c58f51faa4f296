// src/asset_cache/policy.rs

use axum::http::{header, HeaderMap, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estrategia {
    // Navegação: rede -> cache -> página offline -> 503
    NetworkFirst,
    // Demais GETs: cache -> rede -> cache reserva -> 503
    CacheFirst,
    // Não-GET vai direto para a origem
    PassThrough,
}

/// Requisição de documento: `Sec-Fetch-Mode: navigate` ou `Accept` pedindo HTML.
pub fn is_navigation(headers: &HeaderMap) -> bool {
    let navega = headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("navigate"));
    if navega {
        return true;
    }

    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

pub fn escolher(metodo: &Method, headers: &HeaderMap) -> Estrategia {
    if metodo != Method::GET {
        Estrategia::PassThrough
    } else if is_navigation(headers) {
        Estrategia::NetworkFirst
    } else {
        Estrategia::CacheFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn navegacao_e_network_first() {
        let mut headers = HeaderMap::new();
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        assert_eq!(escolher(&Method::GET, &headers), Estrategia::NetworkFirst);

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        assert_eq!(escolher(&Method::GET, &headers), Estrategia::NetworkFirst);
    }

    #[test]
    fn asset_comum_e_cache_first() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("image/png"));
        assert_eq!(escolher(&Method::GET, &headers), Estrategia::CacheFirst);
        assert_eq!(escolher(&Method::GET, &HeaderMap::new()), Estrategia::CacheFirst);
    }

    #[test]
    fn nao_get_passa_direto() {
        assert_eq!(escolher(&Method::POST, &HeaderMap::new()), Estrategia::PassThrough);
        assert_eq!(escolher(&Method::DELETE, &HeaderMap::new()), Estrategia::PassThrough);
    }
}
