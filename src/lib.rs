//! # HaiTale
//!
//! Núcleo de recomendação de mods para HyTale.
//!
//! O usuário descreve em texto livre o mundo que quer criar e recebe mods
//! ranqueados. Um modelo de linguagem externo faz o ranking; quando ele não
//! está disponível, um score por regras assume.
//!
//! ## Módulos
//!
//! - [`recommend`] - Orquestração, prompts e parser da saída do modelo
//! - [`client`] - Cliente resiliente (retry, backoff, circuit breaker)
//! - [`scoring`] - Score por regras e pré-filtro de candidatos
//! - [`cache`] - Cache LRU com TTL das respostas do modelo
//! - [`catalog`] - Fontes de catálogo
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

pub mod cache;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod recommend;
pub mod scoring;
pub mod types;

pub use recommend::RecommendationOrchestrator;
pub use types::config::Config;
pub use types::errors::{HaitaleError, HaitaleResult};
