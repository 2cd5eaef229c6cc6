//! Cache LRU com TTL para respostas do modelo.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

/// Capacidade usada quando a configuração pede zero entradas.
const MIN_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

/// Resposta em cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Chave da entrada.
    pub key: String,

    /// Texto devolvido pelo modelo.
    pub response_text: String,

    /// Momento em que foi cacheada.
    pub created_at: Instant,
}

impl CacheEntry {
    /// Cria uma nova entrada.
    pub fn new(key: impl Into<String>, response_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            response_text: response_text.into(),
            created_at: Instant::now(),
        }
    }

    /// Verifica se a entrada expirou (viva enquanto `idade < ttl`).
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache de respostas do modelo.
///
/// Entradas expiradas são removidas no acesso; quando cheio, a inserção
/// descarta a entrada usada há mais tempo.
pub struct ResponseCache {
    cache: LruCache<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Cria um novo cache.
    ///
    /// # Argumentos
    /// - `max_entries`: Número máximo de entradas (mínimo 1)
    /// - `ttl`: Tempo de vida das entradas
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(MIN_CAPACITY);
        Self {
            cache: LruCache::new(cap),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Gera a chave de cache.
    ///
    /// Hash SHA256 de modelo + descrição + ids dos candidatos, na ordem dada.
    pub fn cache_key<S: AsRef<str>>(model: &str, description: &str, candidate_ids: &[S]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(description.as_bytes());
        for id in candidate_ids {
            hasher.update([0u8]);
            hasher.update(id.as_ref().as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    /// Busca no cache.
    ///
    /// Retorna `None` se não encontrado ou se expirado.
    pub fn get(&mut self, key: &str) -> Option<String> {
        // peek não altera a ordem LRU
        let is_expired = self.cache.peek(key).map(|c| c.is_expired(self.ttl));

        match is_expired {
            Some(true) => {
                self.cache.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.cache.get(key).map(|c| c.response_text.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insere no cache.
    ///
    /// Com o cache cheio, entradas expiradas saem antes da vítima do LRU.
    pub fn insert(&mut self, key: String, response_text: impl Into<String>) {
        if self.cache.len() >= self.cache.cap().get() && !self.cache.contains(key.as_str()) {
            self.cleanup_expired();
        }

        let entry = CacheEntry::new(key.as_str(), response_text);
        // push devolve a entrada antiga da mesma chave ou a vítima do LRU
        if let Some((evicted, _)) = self.cache.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(evicted_key = %evicted, "Response cache full, evicted LRU entry");
            }
        }
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Remove entradas expiradas.
    fn cleanup_expired(&mut self) {
        let expired_keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, v)| v.is_expired(self.ttl))
            .map(|(k, _)| k.clone())
            .collect();

        for key in expired_keys {
            self.cache.pop(&key);
        }
    }
}
