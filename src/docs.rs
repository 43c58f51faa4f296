// src/docs.rs

use utoipa::OpenApi;
use crate::asset_cache;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Empresas ---
        handlers::empresas::create_empresa,
        handlers::empresas::list_empresas,
        handlers::empresas::get_empresa,
        handlers::empresas::update_empresa,
        handlers::empresas::delete_empresa,
        handlers::empresas::vincular_cliente,
        handlers::empresas::list_clientes,
        handlers::empresas::desvincular_cliente,
        handlers::empresas::bulk_clientes,

        // --- Oportunidades ---
        handlers::oportunidades::create_oportunidade,
        handlers::oportunidades::list_oportunidades,
        handlers::oportunidades::get_oportunidade,
        handlers::oportunidades::update_oportunidade,
        handlers::oportunidades::update_status,
        handlers::oportunidades::delete_oportunidade,

        // --- Wishlist ---
        handlers::wishlist::create_item,
        handlers::wishlist::list_items,
        handlers::wishlist::get_item,
        handlers::wishlist::aprovar_item,
        handlers::wishlist::rejeitar_item,
        handlers::wishlist::delete_item,
        handlers::wishlist::create_apresentacao,
        handlers::wishlist::list_apresentacoes,
        handlers::wishlist::update_fase,

        // --- Metas ---
        handlers::metas::create_meta,
        handlers::metas::list_metas,
        handlers::metas::get_meta,
        handlers::metas::update_meta,
        handlers::metas::delete_meta,
        handlers::metas::get_progresso,
        handlers::metas::list_progresso,

        // --- Dashboard ---
        handlers::dashboard::get_resultados,
        handlers::dashboard::get_parceiros,
        handlers::dashboard::get_recebimento,
        handlers::dashboard::get_tendencia,
        handlers::dashboard::get_relevancia,

        // --- Sugestões ---
        handlers::suggestions::suggest_partners,

        // --- Assets ---
        handlers::assets::post_message,
        handlers::assets::post_sync,
    ),
    components(
        schemas(
            // --- Empresas ---
            models::empresa::TipoEmpresa,
            models::empresa::StatusEmpresa,
            models::empresa::Empresa,
            models::empresa::EmpresaCliente,
            models::empresa::ClienteVinculado,
            models::empresa::ResultadoBulk,
            models::empresa::ItemBulkResultado,
            models::empresa::BulkClientesResumo,
            handlers::empresas::EmpresaPayload,
            handlers::empresas::VincularClientePayload,
            handlers::empresas::BulkClientesPayload,

            // --- Oportunidades ---
            models::oportunidade::StatusOportunidade,
            models::oportunidade::Oportunidade,
            models::oportunidade::OportunidadeDetalhada,
            handlers::oportunidades::OportunidadePayload,
            handlers::oportunidades::StatusPayload,

            // --- Wishlist ---
            models::wishlist::StatusWishlist,
            models::wishlist::FasePipeline,
            models::wishlist::TipoApresentacao,
            models::wishlist::WishlistItem,
            models::wishlist::WishlistApresentacao,
            models::wishlist::FaseAtualizada,
            handlers::wishlist::WishlistItemPayload,
            handlers::wishlist::ApresentacaoPayload,
            handlers::wishlist::FasePayload,

            // --- Metas ---
            models::meta::TipoMeta,
            models::meta::PeriodoMeta,
            models::meta::SegmentoMeta,
            models::meta::FiltroStatusMeta,
            models::meta::Meta,
            models::meta::StatusProgresso,
            models::meta::MetaProgresso,
            handlers::metas::MetaPayload,

            // --- Dashboard ---
            models::dashboard::ResultadosStats,
            models::dashboard::ContagemStatus,
            models::dashboard::ParceiroStats,
            models::dashboard::CelulaMatriz,
            models::dashboard::PainelParceiros,
            models::dashboard::RecebimentoEmpresa,
            models::dashboard::SemanaTendencia,
            models::dashboard::SinaisParceiro,
            models::dashboard::RelevanciaParceiro,

            // --- Sugestões ---
            models::sugestao::SugestaoRequest,
            models::sugestao::SugestaoParceiro,
            models::sugestao::SugestaoResponse,

            // --- Assets ---
            asset_cache::TipoMensagem,
            asset_cache::MensagemCache,
            asset_cache::Ack,
        )
    ),
    tags(
        (name = "Empresas", description = "Cadastro de empresas e carteira de clientes"),
        (name = "Oportunidades", description = "Indicações entre empresas"),
        (name = "Wishlist", description = "Pedidos de apresentação e pipeline"),
        (name = "Metas", description = "Metas e acompanhamento"),
        (name = "Dashboard", description = "Indicadores e gráficos gerenciais"),
        (name = "Sugestões", description = "Sugestão de parceiros para uma oportunidade"),
        (name = "Assets", description = "Gateway offline do app")
    )
)]
pub struct ApiDoc;
