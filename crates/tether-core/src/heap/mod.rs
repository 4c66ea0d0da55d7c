//! Handle heap
//!
//! Maps managed objects to opaque 64-bit handles and back so the foreign
//! caller can hold references it cannot allocate or collect itself.
//!
//! # Identity
//!
//! The object → handle direction is keyed by [`ManagedRef::identity`], never by
//! value. Two equal but distinct objects receive distinct handles. The heap
//! keeps a strong reference for every live entry, so an identity cannot be
//! recycled by the allocator while its entry is live.
//!
//! # Reclamation
//!
//! Collection is cooperative and driven from outside:
//!
//! ```text
//! start_gc()          boundary S = next handle to be issued
//! <foreign scan>      caller lists every handle it may still hold
//! end_gc(active)      drop entries with handle < S that are not active
//! ```
//!
//! Entries with handle >= S are never dropped in that cycle. The scan is not
//! synchronized with [`HandleHeap::get_handle`], so anything issued after the
//! boundary may simply not have been seen yet.
//! [`HandleHeap::cycle_gc`] ends one cycle and starts the next in one step and
//! reports the churn since the previous boundary.

mod seed;

pub use seed::{initial_handle, SeedSource};

use crate::config::HeapConfig;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_sdk::{ConvertError, ManagedRef};
use tracing::debug;

/// Opaque handle issued to the foreign caller
pub type Handle = u64;

/// Heap lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// Handle never issued by this heap, or already reclaimed
    #[error("No such handle: {0:#x}")]
    UnknownHandle(Handle),
}

/// Heap lookup result
pub type HeapResult<T> = Result<T, HeapError>;

impl From<HeapError> for ConvertError {
    fn from(err: HeapError) -> Self {
        match err {
            HeapError::UnknownHandle(handle) => ConvertError::UnknownHandle(handle),
        }
    }
}

/// Heap statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Handles currently live
    pub live_handles: usize,

    /// Handles issued since the heap was created
    pub handles_issued: u64,

    /// Completed sweeps
    pub cycles: u64,

    /// Handles reclaimed by all sweeps
    pub handles_reclaimed: u64,

    /// Churn reported by the last `cycle_gc`
    pub last_churn: u64,
}

#[derive(Debug, Default)]
struct CycleState {
    cycles: u64,
    reclaimed: u64,
    last_churn: u64,
}

/// Identity-keyed bidirectional handle table
pub struct HandleHeap {
    /// Object identity → handle
    objects: DashMap<usize, Handle, FxBuildHasher>,

    /// Handle → object
    handles: DashMap<Handle, ManagedRef, FxBuildHasher>,

    /// First handle this heap issued
    first: Handle,

    /// Next handle to issue
    next: AtomicU64,

    /// Boundary recorded by the last `start_gc`
    snapshot: AtomicU64,

    /// Serializes reclamation phases; never taken by lookups
    cycle: Mutex<CycleState>,
}

impl HandleHeap {
    /// Create a heap from configuration
    pub fn new(config: &HeapConfig) -> Self {
        let first = initial_handle(config.seed);
        Self {
            objects: DashMap::with_capacity_and_hasher(
                config.initial_capacity,
                FxBuildHasher::default(),
            ),
            handles: DashMap::with_capacity_and_hasher(
                config.initial_capacity,
                FxBuildHasher::default(),
            ),
            first,
            next: AtomicU64::new(first),
            snapshot: AtomicU64::new(first),
            cycle: Mutex::new(CycleState::default()),
        }
    }

    /// Create a heap whose first handle is `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::new(&HeapConfig::default().with_seed(SeedSource::Fixed(seed)))
    }

    /// Get the handle for an object, issuing one if needed
    ///
    /// Returns the same handle for the same object for as long as its entry
    /// is live, including when several threads race on one object.
    pub fn get_handle(&self, object: &ManagedRef) -> Handle {
        let key = object.identity();
        if let Some(handle) = self.objects.get(&key) {
            return *handle;
        }

        // The entry holds this key's shard lock, so a racing caller with the
        // same object waits here and then sees the published handle.
        let entry = self.objects.entry(key).or_insert_with(|| {
            let handle = self.allocate();
            self.handles.insert(handle, object.clone());
            handle
        });
        *entry
    }

    /// Resolve a handle to its object
    pub fn get_object(&self, handle: Handle) -> HeapResult<ManagedRef> {
        match self.handles.get(&handle) {
            Some(object) => Ok(object.clone()),
            None => {
                debug!(handle = format_args!("{:#x}", handle), "unknown handle");
                Err(HeapError::UnknownHandle(handle))
            }
        }
    }

    /// Check whether a handle is live
    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.contains_key(&handle)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if no handles are live
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// First handle this heap issued
    pub fn first_handle(&self) -> Handle {
        self.first
    }

    /// Boundary of the current cycle
    pub fn snapshot(&self) -> Handle {
        self.snapshot.load(Ordering::Acquire)
    }

    /// Record the boundary for a new reclamation cycle
    pub fn start_gc(&self) {
        let _cycle = self.cycle.lock();
        self.begin_cycle();
    }

    /// Finish the current cycle
    ///
    /// Removes every entry below the boundary that is not listed in `active`
    /// and returns how many were removed.
    pub fn end_gc(&self, active: &[Handle]) -> usize {
        let mut cycle = self.cycle.lock();
        let boundary = self.snapshot.load(Ordering::Acquire);
        let reclaimed = self.sweep(boundary, active);

        cycle.cycles += 1;
        cycle.reclaimed += reclaimed as u64;
        reclaimed
    }

    /// Finish the current cycle and start the next one
    ///
    /// Returns the number of handles issued since the previous boundary.
    pub fn cycle_gc(&self, active: &[Handle]) -> u64 {
        let mut cycle = self.cycle.lock();
        let previous = self.snapshot.load(Ordering::Acquire);
        let reclaimed = self.sweep(previous, active);
        let boundary = self.begin_cycle();
        let churn = boundary - previous;

        cycle.cycles += 1;
        cycle.reclaimed += reclaimed as u64;
        cycle.last_churn = churn;

        debug!(
            boundary = format_args!("{:#x}", boundary),
            reclaimed,
            churn,
            live = self.handles.len(),
            "handle heap cycle"
        );
        churn
    }

    /// Get heap statistics
    pub fn stats(&self) -> HeapStats {
        let cycle = self.cycle.lock();
        HeapStats {
            live_handles: self.handles.len(),
            handles_issued: self.next.load(Ordering::Acquire) - self.first,
            cycles: cycle.cycles,
            handles_reclaimed: cycle.reclaimed,
            last_churn: cycle.last_churn,
        }
    }

    fn allocate(&self) -> Handle {
        match self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                next.checked_add(1)
            }) {
            Ok(handle) => handle,
            Err(_) => panic!("Handle space exhausted"),
        }
    }

    fn begin_cycle(&self) -> Handle {
        let boundary = self.next.load(Ordering::Acquire);
        self.snapshot.store(boundary, Ordering::Release);
        boundary
    }

    fn sweep(&self, boundary: Handle, active: &[Handle]) -> usize {
        let mut active = active.to_vec();
        active.sort_unstable();

        // Collect first: removing while iterating would deadlock on the shard
        // the iterator holds.
        let victims: Vec<(Handle, usize)> = self
            .handles
            .iter()
            .filter(|entry| *entry.key() < boundary && active.binary_search(entry.key()).is_err())
            .map(|entry| (*entry.key(), entry.value().identity()))
            .collect();

        let mut reclaimed = 0;
        for (handle, identity) in victims {
            // Object side first, so a concurrent get_handle issues a fresh
            // handle instead of returning the one being removed. Only drop the
            // identity if it still points at this handle.
            self.objects
                .remove_if(&identity, |_, current| *current == handle);
            if self.handles.remove(&handle).is_some() {
                reclaimed += 1;
            }
        }
        reclaimed
    }
}

impl Default for HandleHeap {
    fn default() -> Self {
        Self::new(&HeapConfig::default())
    }
}

impl std::fmt::Debug for HandleHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleHeap")
            .field("first", &format_args!("{:#x}", self.first))
            .field("next", &format_args!("{:#x}", self.next.load(Ordering::Relaxed)))
            .field("snapshot", &format_args!("{:#x}", self.snapshot()))
            .field("live", &self.handles.len())
            .finish()
    }
}
