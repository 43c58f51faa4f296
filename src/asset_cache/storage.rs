// src/asset_cache/storage.rs
//
// Caches nomeados em memória: nome do cache -> (caminho -> resposta).
// Cada cache guarda no máximo `capacidade` entradas; a menos usada sai primeiro.

use std::{collections::HashMap, num::NonZeroUsize};

use lru::LruCache;
use tokio::sync::Mutex;

use super::RespostaAsset;

pub struct CacheStorage {
    capacidade: NonZeroUsize,
    // `get` do LRU promove a entrada, então até a leitura precisa de acesso exclusivo
    caches: Mutex<HashMap<String, LruCache<String, RespostaAsset>>>,
}

impl CacheStorage {
    pub fn new(capacidade: NonZeroUsize) -> Self {
        Self {
            capacidade,
            caches: Mutex::new(HashMap::new()),
        }
    }

    pub async fn put(&self, cache: &str, caminho: &str, resposta: RespostaAsset) {
        let mut caches = self.caches.lock().await;
        caches
            .entry(cache.to_string())
            .or_insert_with(|| LruCache::new(self.capacidade))
            .put(caminho.to_string(), resposta);
    }

    pub async fn get(&self, cache: &str, caminho: &str) -> Option<RespostaAsset> {
        let mut caches = self.caches.lock().await;
        caches.get_mut(cache).and_then(|c| c.get(caminho)).cloned()
    }

    /// Procura em todos os caches, na ordem dos nomes informados
    pub async fn get_any(&self, nomes: &[&str], caminho: &str) -> Option<RespostaAsset> {
        let mut caches = self.caches.lock().await;
        for nome in nomes {
            if let Some(resposta) = caches.get_mut(*nome).and_then(|c| c.get(caminho)) {
                return Some(resposta.clone());
            }
        }
        None
    }

    pub async fn nomes(&self) -> Vec<String> {
        let mut nomes: Vec<String> = self.caches.lock().await.keys().cloned().collect();
        nomes.sort();
        nomes
    }

    pub async fn delete(&self, cache: &str) -> bool {
        self.caches.lock().await.remove(cache).is_some()
    }

    #[cfg(test)]
    pub async fn len(&self, cache: &str) -> usize {
        self.caches.lock().await.get(cache).map_or(0, LruCache::len)
    }
}
