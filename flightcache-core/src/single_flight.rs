use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

type Waiters<V, E> = Vec<oneshot::Sender<Result<V, E>>>;

/// Registry of in-flight computations, one per key.
///
/// The first caller asking for a key becomes the producer: its compute
/// function runs on a dedicated thread and every caller that asks for the
/// same key while it runs joins the same flight. When the computation ends the
/// registry entry is removed and the result is sent to every waiter in the
/// same step, so a caller arriving afterwards always starts a fresh flight.
///
/// Results, errors included, are fanned out as-is; nothing is retried here.
///
/// The registry is a `DashMap`: its entry API makes "join or start" atomic
/// per key, and nobody holds a lock while a compute function runs.
///
/// # Examples
///
/// ```
/// use flightcache_core::SingleFlight;
///
/// let flights: SingleFlight<&str, u32, String> = SingleFlight::new();
/// let flight = flights.wait_or_run("answer", || Ok(42));
/// assert!(flight.is_leader());
/// assert_eq!(flight.wait(), Ok(42));
/// assert!(!flights.is_in_flight("answer"));
/// ```
pub struct SingleFlight<K, V, E>
where
    K: Eq + Hash,
{
    busy: Arc<DashMap<K, Waiters<V, E>>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            busy: Arc::new(DashMap::new()),
        }
    }

    /// Joins the flight for `key`, starting one with `compute` if none is running.
    ///
    /// `compute` is dropped unused when a flight is already in progress.
    ///
    /// # Returns
    ///
    /// A [`Flight`] that yields the single result of the computation.
    pub fn wait_or_run<F>(&self, key: K, compute: F) -> Flight<V, E>
    where
        F: FnOnce() -> Result<V, E> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        match self.busy.entry(key.clone()) {
            Entry::Occupied(mut waiting) => {
                waiting.get_mut().push(sender);
                trace!(waiters = waiting.get().len(), "joined in-flight computation");
                return Flight {
                    receiver,
                    leader: false,
                };
            }
            Entry::Vacant(vacant) => {
                vacant.insert(vec![sender]);
            }
        }

        trace!("starting computation");
        let guard = FlightGuard {
            key: Some(key),
            busy: Arc::clone(&self.busy),
        };
        let spawned = thread::Builder::new()
            .name("flightcache-producer".to_string())
            .spawn(move || {
                let result = compute();
                guard.complete(result);
            });

        // On failure the closure, and with it the guard, is dropped: the
        // registry entry goes away and every waiter sees an abandoned flight.
        if let Err(err) = spawned {
            error!(error = %err, "failed to spawn producer thread");
        }

        Flight {
            receiver,
            leader: true,
        }
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.busy.len()
    }

    pub fn is_in_flight<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.busy.contains_key(key)
    }

    /// Number of callers (producer included) waiting on `key`'s flight.
    pub fn waiting<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.busy.get(key).map_or(0, |waiters| waiters.len())
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> Clone for SingleFlight<K, V, E>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            busy: Arc::clone(&self.busy),
        }
    }
}

/// One caller's stake in a computation.
#[must_use = "a flight does nothing for the caller unless waited on"]
pub struct Flight<V, E> {
    receiver: oneshot::Receiver<Result<V, E>>,
    leader: bool,
}

impl<V, E> Flight<V, E> {
    /// `true` if this call started the computation.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Blocks the current thread until the computation finishes.
    ///
    /// There is no timeout: the wait lasts as long as the compute function.
    ///
    /// # Panics
    ///
    /// If the compute function panicked, the flight is abandoned and every
    /// waiter panics as well. This must not be called from inside an async
    /// runtime worker, since it blocks the thread.
    pub fn wait(self) -> Result<V, E> {
        match self.receiver.blocking_recv() {
            Ok(result) => result,
            Err(_) => panic!("in-flight computation was abandoned: the compute function panicked"),
        }
    }
}

/// Owns the producer's registry slot; clears it even if the compute panics.
struct FlightGuard<K: Eq + Hash, V, E> {
    key: Option<K>,
    busy: Arc<DashMap<K, Waiters<V, E>>>,
}

impl<K: Eq + Hash, V: Clone, E: Clone> FlightGuard<K, V, E> {
    fn complete(mut self, result: Result<V, E>) {
        let Some(key) = self.key.take() else {
            return;
        };
        // Removal and fan-out happen together: later callers start over.
        if let Some((_, waiters)) = self.busy.remove(&key) {
            debug!(
                waiters = waiters.len(),
                ok = result.is_ok(),
                "computation finished"
            );
            fan_out(waiters, result);
        }
    }
}

impl<K: Eq + Hash, V, E> Drop for FlightGuard<K, V, E> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            if let Some((_, waiters)) = self.busy.remove(&key) {
                warn!(waiters = waiters.len(), "computation abandoned");
            }
        }
    }
}

fn fan_out<V: Clone, E: Clone>(mut waiters: Waiters<V, E>, result: Result<V, E>) {
    let last = waiters.pop();
    for sender in waiters {
        // a closed receiver only means that caller is gone
        let _ = sender.send(result.clone());
    }
    if let Some(sender) = last {
        let _ = sender.send(result);
    }
}
