//! Time-bounded memo of query outcomes

use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tickerboard::data::{Interval, PriceQuery};
use tokio::sync::RwLock;
use tracing::debug;

/// Identity of a multi-symbol query. Symbol order and repeats do not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl QueryKey {
    pub fn new(symbols: &[String], query: &PriceQuery) -> Self {
        let mut symbols = symbols.to_vec();
        symbols.sort();
        symbols.dedup();
        Self {
            symbols,
            start: query.start,
            end: query.end,
            interval: query.interval,
        }
    }
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, (Instant::now(), value));
    }

    /// Cached value, or compute and store a new one.
    ///
    /// `keep` decides whether a freshly computed value may be stored.
    pub async fn get_or_insert_with<F, Fut>(&self, key: K, compute: F, keep: impl Fn(&V) -> bool) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(hit) = self.get(&key).await {
            debug!("Cache hit");
            return hit;
        }
        debug!("Cache miss");
        let value = compute().await;
        if keep(&value) {
            self.insert(key, value.clone()).await;
        }
        value
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
