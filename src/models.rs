pub mod dashboard;
pub mod empresa;
pub mod meta;
pub mod oportunidade;
pub mod sugestao;
pub mod wishlist;
