// src/handlers.rs

pub mod assets;
pub mod dashboard;
pub mod empresas;
pub mod metas;
pub mod oportunidades;
pub mod suggestions;
pub mod wishlist;
