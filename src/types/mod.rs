//! Tipos compartilhados do HaiTale.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod recommendation;

pub use catalog::{CatalogEntry, ModSource};
pub use recommendation::Recommendation;
