//! # Flightcache
//!
//! A bounded, thread-safe in-memory cache with FIFO or LRU eviction, optional
//! time-to-live expiry and single-flight protection against cache stampedes.
//!
//! ## Features
//!
//! - **Bounded**: never holds more than `max_entries` live entries
//! - **Eviction Policies**: FIFO ignores reads, LRU moves read entries to the front
//! - **Single Flight**: concurrent misses for one key run the compute function once
//!   and all receive its result
//! - **Errors Are Not Cached**: the next call after a failure computes again
//! - **TTL Support**: stale entries are never returned; under FIFO an expired run is
//!   pruned in one step
//! - **Statistics**: hit/miss/eviction/expiration counters (feature `stats`, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use flightcache::{Cache, LruCache};
//!
//! let cache: LruCache<String, u64, String> = LruCache::new(1000);
//!
//! let len = cache
//!     .get_or_add("hello".to_string(), || Ok(5))
//!     .unwrap();
//! assert_eq!(len, 5);
//!
//! // second call is served from the cache
//! let len = cache.must_get_or_add("hello".to_string(), || unreachable!());
//! assert_eq!(len, 5);
//! ```
//!
//! ## Choosing the Cache at Runtime
//!
//! ```rust
//! use flightcache::{Cache, CacheConfig, EvictionPolicy};
//! use std::time::Duration;
//!
//! let policy: EvictionPolicy = "fifo".parse().unwrap();
//! let cache = CacheConfig::builder()
//!     .max_entries(64)
//!     .eviction_policy(policy)
//!     .max_age(Duration::from_secs(60))
//!     .build()
//!     .build::<u32, Vec<u8>, String>();
//!
//! cache.add(1, vec![1, 2, 3]);
//! assert_eq!(cache.get(&1), Some(vec![1, 2, 3]));
//! ```
//!
//! ## Sharing a Cache
//!
//! Cache handles are cheap to clone; every clone talks to the same cache. A
//! process-wide cache can live in a `once_cell::sync::Lazy` static:
//!
//! ```rust
//! use flightcache::{Cache, FifoCache};
//! use once_cell::sync::Lazy;
//!
//! static NAMES: Lazy<FifoCache<u32, String, String>> = Lazy::new(|| FifoCache::new(100));
//!
//! NAMES.add(7, "seven".to_string());
//! assert_eq!(NAMES.get(&7).as_deref(), Some("seven"));
//! ```
//!
//! ## Blocking
//!
//! Lookups that miss block the calling thread until the computation finishes.
//! Call them from plain threads or `spawn_blocking`, not from async tasks.
pub use flightcache_core::*;
