//! Aurora Cache — three-tier cache tiering (C12).
//!
//! Three layers sit behind one `get`/`set`/`delete` surface:
//!
//! # Tier 1: Memory
//!
//! An in-process byte-size LRU, default budget 2 GiB of serialized
//! value bytes. Fastest, volatile, optionally TTL-bounded per entry.
//!
//! # Tier 2: Disk
//!
//! A persistent, namespaced [`KvStore`] — **`SurrealKV`**, an
//! embedded, versioned, ACID-compliant LSM-tree store, behind the
//! **`kv`** feature. Survives restarts; no TTL of its own.
//!
//! # Tier 3: Remote (optional)
//!
//! An application-supplied [`RemoteCache`] for a shared network cache.
//! Checked only after memory and disk miss.
//!
//! A hit in a lower tier is written back into every higher tier before
//! it is returned, so an immediate repeat lookup for the same key
//! always resolves from memory.
//!
//! # Feature Flags
//!
//! - **`kv`** — enables [`SurrealKvStore`], the persistent disk-tier
//!   backend. Without it, callers must supply their own [`KvStore`]
//!   (e.g. [`MemoryKvStore`]) for the disk tier — useful for tests.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;
pub mod manager;

pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore, ScopedKvStore};
pub use manager::{
    CacheLookup, CacheManager, CacheTier, RemoteCache, TierSelector, TierStatsSnapshot,
    DEFAULT_MEMORY_BUDGET_BYTES,
};

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
