// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Extrator de idioma (primeira tag do Accept-Language, sem região)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    pub fn from_header(value: Option<&str>) -> Self {
        let default_lang = "pt".to_string();

        let lang = value
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o primeiro idioma (ex: "pt-BR")
                    .map(|tag_string| {
                        // "pt-BR" -> "pt"
                        tag_string.split('-').next().unwrap_or(tag_string.as_str()).to_lowercase()
                    })
            })
            .unwrap_or(default_lang);

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}
