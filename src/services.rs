pub mod pipeline_sync;
pub mod empresa_service;
pub mod bulk_cliente_service;
pub mod oportunidade_service;
pub mod wishlist_service;
pub mod meta_service;
pub mod dashboard_service;
pub mod llm_client;
pub mod suggestion_service;
