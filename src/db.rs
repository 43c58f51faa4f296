pub mod empresa_repo;
pub use empresa_repo::EmpresaRepository;
pub mod oportunidade_repo;
pub use oportunidade_repo::OportunidadeRepository;
pub mod wishlist_repo;
pub use wishlist_repo::WishlistRepository;
pub mod meta_repo;
pub use meta_repo::MetaRepository;
