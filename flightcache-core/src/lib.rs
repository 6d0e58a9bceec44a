//! # Flightcache Core
//!
//! Building blocks for a bounded, thread-safe in-memory cache.
//!
//! A cache here is a key/value store with a hard bound on live entries, an
//! eviction policy choosing what goes when the bound is hit, and a
//! single-flight coordinator making sure that concurrent misses for one key
//! run the expensive computation only once.
//!
//! ## Features
//!
//! - **Eviction Policies**: FIFO (reads never reorder) and LRU (reads move the entry to the front)
//! - **Stampede Protection**: concurrent misses for a key share one computation and its result
//! - **Errors Are Not Cached**: a failed computation reaches every waiter, the next call retries
//! - **TTL Support**: a decorator expiring entries after a fixed age; under FIFO a whole
//!   expired run is pruned in one truncation
//! - **Statistics**: hit/miss/eviction/expiration counters behind the `stats` feature
//!
//! ## Module Organization
//!
//! - [`list`] - Ordered entry list with stable handles and suffix truncation
//! - [`eviction_policy`] - FIFO and LRU policy capabilities
//! - [`store`] - Bounded key/value store over the entry list
//! - [`single_flight`] - Registry of in-flight computations
//! - [`cache`] - The cache façade and the uniform [`Cache`] trait
//! - [`ttl_cache`] - Time-to-live decorator
//! - [`config`] - Construction-time configuration
//!
//! ## Example
//!
//! ```
//! use flightcache_core::{Cache, FifoCache};
//!
//! let cache: FifoCache<u64, String, String> = FifoCache::new(2);
//! cache.add(1, "one".to_string());
//! cache.add(2, "two".to_string());
//! cache.add(3, "three".to_string());
//!
//! // FIFO: the oldest insertion went first
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get_or_default(&1), "");
//! assert_eq!(cache.len(), 2);
//! ```
pub mod cache;
pub mod config;
pub mod eviction_policy;
pub mod list;
pub mod single_flight;
pub mod store;
pub mod ttl_cache;

mod cache_entry;

#[cfg(feature = "stats")]
mod stats;

pub use cache::{BoundedCache, Cache, FifoCache, LruCache};
pub use cache_entry::AgedValue;
pub use config::{CacheConfig, CacheConfigBuilder, ConfiguredCache, DEFAULT_MAX_ENTRIES};
pub use eviction_policy::{EvictionPolicy, Fifo, Lru, ParsePolicyError, Policy};
pub use list::{EntryList, NodeHandle};
pub use single_flight::{Flight, SingleFlight};
pub use store::BoundedStore;
pub use ttl_cache::{TtlCache, TtlFifoCache, TtlLruCache};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
