use crate::loader::{self, LoadOptions, LoadReport};
use crate::trie::Trie;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task;
use tracing::debug;

/// Fuzzy results keyed by pattern, valid for one generation of the trie.
#[derive(Default)]
struct FuzzyCache {
    generation: u64,
    entries: HashMap<String, Arc<Vec<String>>>,
}

/// Word dictionary shared between tasks, with cached fuzzy lookups
#[derive(Clone)]
pub struct Dictionary {
    trie: Arc<RwLock<Trie>>,
    fuzzy_cache: Arc<Mutex<FuzzyCache>>,
}

impl Dictionary {
    pub fn new(trie: Trie) -> Self {
        Self {
            trie: Arc::new(RwLock::new(trie)),
            fuzzy_cache: Arc::new(Mutex::new(FuzzyCache::default())),
        }
    }

    /// Loads a dictionary from a word list, one word per line
    pub fn load(path: &Path, options: &LoadOptions) -> Result<(Self, LoadReport)> {
        let mut trie = Trie::new();
        let report = loader::load_file(&mut trie, path, options)
            .with_context(|| format!("loading dictionary from {}", path.display()))?;
        Ok((Self::new(trie), report))
    }

    /// Number of stored words
    pub async fn len(&self) -> usize {
        self.trie.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trie.read().await.is_empty()
    }

    /// Number of trie nodes and the letters used by any word
    pub async fn shape(&self) -> (usize, u64) {
        let trie = self.trie.read().await;
        (trie.node_count(), trie.mask())
    }

    pub async fn contains(&self, word: &str) -> bool {
        self.trie.read().await.contains(word)
    }

    /// All words, sorted
    pub async fn words(&self) -> Vec<String> {
        let mut words = self.trie.read().await.keys();
        words.sort_unstable();
        words
    }

    /// Words starting with prefix, sorted
    pub async fn words_starting_with(&self, prefix: &str) -> Result<Vec<String>> {
        let mut words = self.trie.read().await.prefix_search(prefix)?;
        words.sort_unstable();
        Ok(words)
    }

    /// Words containing pattern as a subsequence (cached)
    pub async fn fuzzy_matches(&self, pattern: &str) -> Result<Arc<Vec<String>>> {
        // Check cache
        let generation = {
            let cache = self.fuzzy_cache.lock().await;
            if let Some(matches) = cache.entries.get(pattern) {
                debug!(pattern, "fuzzy cache hit");
                return Ok(matches.clone());
            }
            cache.generation
        };

        // Search off the async workers
        let trie = self.trie.clone();
        let owned = pattern.to_string();
        let matches = task::spawn_blocking(move || trie.blocking_read().fuzzy_search(&owned))
            .await
            .context("fuzzy search task failed")??;
        let matches = Arc::new(matches);

        // Update cache unless a write happened meanwhile
        let mut cache = self.fuzzy_cache.lock().await;
        if cache.generation == generation {
            cache.entries.insert(pattern.to_string(), matches.clone());
        }

        Ok(matches)
    }

    /// Adds a word, returning its length
    pub async fn add_word(&self, word: &str) -> Result<usize> {
        let mut trie = self.trie.write().await;
        let depth = trie.add(word)?;
        self.invalidate().await;
        Ok(depth)
    }

    /// Removes a word
    pub async fn remove_word(&self, word: &str) -> Result<()> {
        let mut trie = self.trie.write().await;
        trie.remove(word)?;
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        let mut cache = self.fuzzy_cache.lock().await;
        cache.generation += 1;
        cache.entries.clear();
    }
}
