//! Cache de respostas do modelo.
//!
//! Este módulo implementa um cache Least Recently Used (LRU) com TTL para
//! respostas da API de completions, evitando chamadas repetidas para a
//! mesma descrição e o mesmo conjunto de candidatos.

mod lru;

pub use lru::{CacheEntry, CacheStats, ResponseCache};
