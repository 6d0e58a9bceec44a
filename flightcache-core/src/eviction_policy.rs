use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Represents the policy used for evicting entries from a cache when it reaches its limit.
///
/// This is the runtime (configuration) view of a policy. Caches themselves are
/// parameterized by a [`Policy`] marker type ([`Fifo`] or [`Lru`]), so the
/// policy decision costs nothing on the hot path.
///
/// # Variants
///
/// * `FIFO` - **First In, First Out**
///   - The earliest inserted live entry is evicted first
///   - Reading a cached value does NOT change its position
///   - Reads only need a shared lock
///
/// * `LRU` - **Least Recently Used** (default)
///   - The least recently accessed entry is evicted first
///   - Reads and writes move the entry to the most recent position
///   - Reads need the exclusive lock, because they reorder
///
/// # Examples
///
/// ```
/// use flightcache_core::EvictionPolicy;
///
/// let policy: EvictionPolicy = "fifo".parse().unwrap();
/// assert_eq!(policy, EvictionPolicy::FIFO);
///
/// assert_eq!(EvictionPolicy::default(), EvictionPolicy::LRU);
/// assert!("random".parse::<EvictionPolicy>().is_err());
/// ```
///
/// # Performance Characteristics
///
/// | Policy | Eviction | Cache Hit | Cache Miss | Read lock |
/// |--------|----------|-----------|------------|-----------|
/// | FIFO   | O(1)     | O(1)      | O(1)       | shared    |
/// | LRU    | O(1)     | O(1)      | O(1)       | exclusive |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvictionPolicy {
    FIFO,
    #[default]
    LRU,
}

impl EvictionPolicy {
    /// Whether a read moves the entry to the front.
    pub const fn reorders_on_access(self) -> bool {
        match self {
            EvictionPolicy::FIFO => Fifo::REORDER_ON_ACCESS,
            EvictionPolicy::LRU => Lru::REORDER_ON_ACCESS,
        }
    }

    /// Whether list order (front to back) is also insertion-age order.
    pub const fn is_age_ordered(self) -> bool {
        match self {
            EvictionPolicy::FIFO => Fifo::AGE_ORDERED,
            EvictionPolicy::LRU => Lru::AGE_ORDERED,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::FIFO => Fifo::NAME,
            EvictionPolicy::LRU => Lru::NAME,
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known eviction policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown eviction policy `{0}` (expected `fifo` or `lru`)")]
pub struct ParsePolicyError(pub String);

/// Case-insensitive: `"fifo"`, `"FIFO"`, `"lru"`, `"Lru"`...
impl FromStr for EvictionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::FIFO),
            "lru" => Ok(EvictionPolicy::LRU),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Static capabilities of an eviction policy.
///
/// The store consults [`REORDER_ON_ACCESS`](Self::REORDER_ON_ACCESS) on every
/// hit; the TTL decorator consults [`AGE_ORDERED`](Self::AGE_ORDERED) to decide
/// whether an expired entry can take everything behind it along in one
/// truncation.
pub trait Policy: Send + Sync + 'static {
    const NAME: &'static str;

    /// Move the entry to the front on every read and overwrite.
    const REORDER_ON_ACCESS: bool;

    /// Front-to-back list order is newest-to-oldest insertion order.
    const AGE_ORDERED: bool;

    fn kind() -> EvictionPolicy;
}

/// First in, first out. Reads never reorder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fifo;

/// Least recently used. Reads and overwrites move the entry to the front.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lru;

impl Policy for Fifo {
    const NAME: &'static str = "fifo";
    const REORDER_ON_ACCESS: bool = false;
    const AGE_ORDERED: bool = true;

    fn kind() -> EvictionPolicy {
        EvictionPolicy::FIFO
    }
}

impl Policy for Lru {
    const NAME: &'static str = "lru";
    const REORDER_ON_ACCESS: bool = true;
    const AGE_ORDERED: bool = false;

    fn kind() -> EvictionPolicy {
        EvictionPolicy::LRU
    }
}
