//! The three-tier cache manager (C12): memory (byte-size LRU), disk
//! (persistent KV), and an optional remote tier, with read-through
//! promotion on hits and selectable write targets.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{StorageError, StorageResult};
use crate::kv::KvStore;

/// Default memory-tier budget: 2 GiB of serialized value bytes.
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Which tier served (or would serve) a cache operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// The in-process byte-size LRU.
    Memory,
    /// The persistent on-disk KV store.
    Disk,
    /// The optional network cache.
    Remote,
}

impl std::fmt::Display for CacheTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Remote => "remote",
        };
        f.write_str(s)
    }
}

/// Hit/miss/eviction counters for one tier.
#[derive(Debug, Default)]
pub struct TierStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// A point-in-time snapshot of a [`TierStats`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierStatsSnapshot {
    /// Successful lookups served by this tier.
    pub hits: u64,
    /// Lookups that missed this tier.
    pub misses: u64,
    /// Entries evicted from this tier.
    pub evictions: u64,
}

impl TierStatsSnapshot {
    /// Fraction of lookups that hit, in `[0.0, 1.0]`. `0.0` if there
    /// were no lookups at all.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl TierStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TierStatsSnapshot {
        TierStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Which tiers a `set` should write to. Defaults to all tiers the
/// manager has configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSelector {
    /// Write to the memory tier.
    pub memory: bool,
    /// Write to the disk tier.
    pub disk: bool,
    /// Write to the remote tier, if one is configured.
    pub remote: bool,
}

impl Default for TierSelector {
    fn default() -> Self {
        Self { memory: true, disk: true, remote: true }
    }
}

impl TierSelector {
    /// Only the memory tier.
    #[must_use]
    pub fn memory_only() -> Self {
        Self { memory: true, disk: false, remote: false }
    }
}

/// An optional network cache tier, checked after memory and disk miss.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Fetch a value, if present remotely.
    async fn remote_get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Write a value remotely.
    async fn remote_set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Delete a value remotely.
    async fn remote_delete(&self, namespace: &str, key: &str) -> StorageResult<()>;
}

struct MemoryEntry {
    value: Vec<u8>,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.ttl.is_some_and(|ttl| self.inserted_at.elapsed() > ttl)
    }
}

/// Byte-size-bounded LRU keyed by `(namespace, key)`. Evicts the least
/// recently touched entry first whenever a `set` would exceed the
/// configured budget.
struct MemoryTier {
    budget_bytes: u64,
    used_bytes: u64,
    entries: HashMap<(String, String), MemoryEntry>,
    recency: VecDeque<(String, String)>,
    stats: TierStats,
}

impl MemoryTier {
    fn new(budget_bytes: u64) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
            entries: HashMap::new(),
            recency: VecDeque::new(),
            stats: TierStats::default(),
        }
    }

    fn touch(&mut self, id: &(String, String)) {
        if let Some(pos) = self.recency.iter().position(|e| e == id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(id.clone());
    }

    fn get(&mut self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let id = (namespace.to_string(), key.to_string());
        let expired = self.entries.get(&id).is_some_and(MemoryEntry::is_expired);
        if expired {
            self.remove(&id);
        }
        if let Some(entry) = self.entries.get(&id) {
            let value = entry.value.clone();
            self.touch(&id);
            self.stats.record_hit();
            Some(value)
        } else {
            self.stats.record_miss();
            None
        }
    }

    fn remove(&mut self, id: &(String, String)) -> Option<Vec<u8>> {
        if let Some(entry) = self.entries.remove(id) {
            self.used_bytes = self.used_bytes.saturating_sub(entry.value.len() as u64);
            if let Some(pos) = self.recency.iter().position(|e| e == id) {
                self.recency.remove(pos);
            }
            Some(entry.value)
        } else {
            None
        }
    }

    fn set(&mut self, namespace: &str, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let id = (namespace.to_string(), key.to_string());
        self.remove(&id);
        let size = value.len() as u64;
        while self.used_bytes + size > self.budget_bytes {
            let Some(victim) = self.recency.pop_front() else { break };
            if self.entries.remove(&victim).is_some() {
                self.stats.record_eviction();
            }
        }
        self.used_bytes += size;
        self.entries.insert(id.clone(), MemoryEntry { value, inserted_at: Instant::now(), ttl });
        self.recency.push_back(id);
    }

    fn delete(&mut self, namespace: &str, key: &str) -> bool {
        self.remove(&(namespace.to_string(), key.to_string())).is_some()
    }

    fn clear_namespace(&mut self, namespace: &str) -> u64 {
        let victims: Vec<(String, String)> =
            self.entries.keys().filter(|(ns, _)| ns == namespace).cloned().collect();
        let count = victims.len() as u64;
        for id in victims {
            self.remove(&id);
        }
        count
    }
}

/// Outcome of a [`CacheManager::get`] call: the value and the tier
/// that served it, or a miss.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Found, along with the tier that served it.
    Hit { value: Vec<u8>, tier: CacheTier },
    /// Not found in any configured tier.
    Miss,
}

/// Coordinates the memory, disk, and optional remote tiers behind a
/// single `get`/`set`/`delete` surface, promoting lower-tier hits into
/// every higher tier before returning them.
pub struct CacheManager {
    memory: Mutex<MemoryTier>,
    disk: Arc<dyn KvStore>,
    disk_stats: TierStats,
    remote: Option<Arc<dyn RemoteCache>>,
    remote_stats: TierStats,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("has_remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Build a manager over the given disk store, using the default
    /// 2 GiB memory budget and no remote tier.
    #[must_use]
    pub fn new(disk: Arc<dyn KvStore>) -> Self {
        Self::with_memory_budget(disk, DEFAULT_MEMORY_BUDGET_BYTES)
    }

    /// Build a manager with an explicit memory-tier byte budget.
    #[must_use]
    pub fn with_memory_budget(disk: Arc<dyn KvStore>, budget_bytes: u64) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::new(budget_bytes)),
            disk,
            disk_stats: TierStats::default(),
            remote: None,
            remote_stats: TierStats::default(),
        }
    }

    /// Attach a remote cache tier, checked after memory and disk miss.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteCache>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Look up `(namespace, key)`. On a disk or remote hit, writes the
    /// value back into every higher tier before returning, so an
    /// immediate repeat lookup hits memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk or remote tier fails. A memory
    /// miss is never an error; it falls through to the next tier.
    pub async fn get(&self, namespace: &str, key: &str) -> StorageResult<CacheLookup> {
        {
            let mut memory = self.memory.lock().await;
            if let Some(value) = memory.get(namespace, key) {
                return Ok(CacheLookup::Hit { value, tier: CacheTier::Memory });
            }
        }

        match self.disk.get(namespace, key).await? {
            Some(value) => {
                self.disk_stats.record_hit();
                self.memory.lock().await.set(namespace, key, value.clone(), None);
                return Ok(CacheLookup::Hit { value, tier: CacheTier::Disk });
            }
            None => self.disk_stats.record_miss(),
        }

        if let Some(remote) = &self.remote {
            match remote.remote_get(namespace, key).await? {
                Some(value) => {
                    self.remote_stats.record_hit();
                    self.disk.set(namespace, key, value.clone()).await?;
                    self.memory.lock().await.set(namespace, key, value.clone(), None);
                    return Ok(CacheLookup::Hit { value, tier: CacheTier::Remote });
                }
                None => self.remote_stats.record_miss(),
            }
        }

        Ok(CacheLookup::Miss)
    }

    /// Write `value` to the selected tiers. `ttl` bounds the memory
    /// tier's entry lifetime; disk and remote tiers do not expire
    /// entries on their own.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected disk or remote write fails.
    pub async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
        tiers: TierSelector,
    ) -> StorageResult<()> {
        if tiers.memory {
            self.memory.lock().await.set(namespace, key, value.clone(), ttl);
        }
        if tiers.disk {
            self.disk.set(namespace, key, value.clone()).await?;
        }
        if tiers.remote && let Some(remote) = &self.remote {
            remote.remote_set(namespace, key, value).await?;
        }
        Ok(())
    }

    /// Remove `(namespace, key)` from every tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk or remote delete fails.
    pub async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        self.memory.lock().await.delete(namespace, key);
        self.disk.delete(namespace, key).await?;
        if let Some(remote) = &self.remote {
            remote.remote_delete(namespace, key).await?;
        }
        Ok(())
    }

    /// Remove every key in `namespace` from every tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk tier's clear fails.
    pub async fn clear_namespace(&self, namespace: &str) -> StorageResult<()> {
        self.memory.lock().await.clear_namespace(namespace);
        self.disk.clear_namespace(namespace).await?;
        Ok(())
    }

    /// Current hit/miss/eviction counters for the memory tier.
    pub async fn memory_stats(&self) -> TierStatsSnapshot {
        self.memory.lock().await.stats.snapshot()
    }

    /// Current hit/miss counters for the disk tier. Disk never evicts
    /// on its own, so `evictions` is always `0`.
    #[must_use]
    pub fn disk_stats(&self) -> TierStatsSnapshot {
        self.disk_stats.snapshot()
    }

    /// Current hit/miss counters for the remote tier, if configured.
    #[must_use]
    pub fn remote_stats(&self) -> Option<TierStatsSnapshot> {
        self.remote.as_ref().map(|_| self.remote_stats.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    fn manager_with_budget(budget: u64) -> CacheManager {
        CacheManager::with_memory_budget(Arc::new(MemoryKvStore::new()), budget)
    }

    #[tokio::test]
    async fn memory_hit_short_circuits_lower_tiers() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        mgr.set("ns", "k", b"v".to_vec(), None, TierSelector::default()).await.unwrap();
        let result = mgr.get("ns", "k").await.unwrap();
        match result {
            CacheLookup::Hit { tier, value } => {
                assert_eq!(tier, CacheTier::Memory);
                assert_eq!(value, b"v");
            }
            CacheLookup::Miss => panic!("expected hit"),
        }
    }

    #[tokio::test]
    async fn disk_hit_promotes_to_memory() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        mgr.set("ns", "k", b"v".to_vec(), None, TierSelector { memory: false, disk: true, remote: false })
            .await
            .unwrap();

        let first = mgr.get("ns", "k").await.unwrap();
        assert!(matches!(first, CacheLookup::Hit { tier: CacheTier::Disk, .. }));

        let second = mgr.get("ns", "k").await.unwrap();
        assert!(matches!(second, CacheLookup::Hit { tier: CacheTier::Memory, .. }));
    }

    #[tokio::test]
    async fn miss_when_absent_everywhere() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        assert!(matches!(mgr.get("ns", "missing").await.unwrap(), CacheLookup::Miss));
    }

    #[tokio::test]
    async fn delete_removes_from_all_tiers() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        mgr.set("ns", "k", b"v".to_vec(), None, TierSelector::default()).await.unwrap();
        mgr.delete("ns", "k").await.unwrap();
        assert!(matches!(mgr.get("ns", "k").await.unwrap(), CacheLookup::Miss));
    }

    #[tokio::test]
    async fn memory_tier_evicts_least_recently_used_past_budget() {
        let mgr = manager_with_budget(16);
        mgr.set("ns", "a", vec![0u8; 8], None, TierSelector::memory_only()).await.unwrap();
        mgr.set("ns", "b", vec![0u8; 8], None, TierSelector::memory_only()).await.unwrap();
        // touching "a" again makes "b" the least-recently-used entry
        let _ = mgr.get("ns", "a").await.unwrap();
        mgr.set("ns", "c", vec![0u8; 8], None, TierSelector::memory_only()).await.unwrap();

        assert!(matches!(mgr.get("ns", "a").await.unwrap(), CacheLookup::Hit { tier: CacheTier::Memory, .. }));
        assert!(matches!(mgr.get("ns", "c").await.unwrap(), CacheLookup::Hit { tier: CacheTier::Memory, .. }));
        assert!(matches!(mgr.get("ns", "b").await.unwrap(), CacheLookup::Miss));

        let stats = mgr.memory_stats().await;
        assert!(stats.evictions >= 1);
    }

    #[tokio::test]
    async fn expired_memory_entry_falls_through_to_disk() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        mgr.set("ns", "k", b"v".to_vec(), Some(Duration::from_millis(1)), TierSelector::default())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = mgr.get("ns", "k").await.unwrap();
        assert!(matches!(result, CacheLookup::Hit { tier: CacheTier::Disk, .. }));
    }

    #[tokio::test]
    async fn hit_rate_reflects_hits_and_misses() {
        let mgr = manager_with_budget(DEFAULT_MEMORY_BUDGET_BYTES);
        mgr.set("ns", "k", b"v".to_vec(), None, TierSelector::default()).await.unwrap();
        let _ = mgr.get("ns", "k").await.unwrap();
        let _ = mgr.get("ns", "missing").await.unwrap();
        let stats = mgr.memory_stats().await;
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
