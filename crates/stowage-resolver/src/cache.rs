use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};

type Slot = Arc<dyn Any + Send + Sync>;

/// Per-contract state.
///
/// `value` is read without locking once set. `attempt` is held for the
/// whole of an initialization and keeps the error of the last failed one;
/// `failures` counts failed attempts so a waiter can tell whether an
/// attempt finished while it was queued.
struct Entry<T> {
    value: OnceCell<Arc<T>>,
    attempt: Mutex<Option<ResolveError>>,
    failures: AtomicUsize,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            value: OnceCell::new(),
            attempt: Mutex::new(None),
            failures: AtomicUsize::new(0),
        }
    }
}

/// One resolved instance per contract for the lifetime of the resolver.
///
/// The map lock is only held while finding or creating a contract's slot.
/// Initialization runs under the slot's own lock, so resolving one contract
/// never blocks resolution of another, and concurrent callers for the same
/// contract wait for a single initialization instead of racing.
///
/// A failed initialization is handed to every caller that was waiting on
/// it and is not cached: a caller arriving after the failure tries again.
#[derive(Default)]
pub struct InstanceCache {
    slots: Mutex<HashMap<TypeId, Slot>>,
    activations: AtomicUsize,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance cached under `key`, created by `init` if absent.
    pub fn get_or_try_init<T, F>(&self, key: TypeId, name: &str, init: F) -> ResolveResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> ResolveResult<T>,
    {
        let entry = self.entry::<T>(key, name)?;
        if let Some(value) = entry.value.get() {
            debug!(contract = name, "cache hit");
            return Ok(Arc::clone(value));
        }

        let seen = entry.failures.load(Ordering::SeqCst);
        let mut last_failure = entry
            .attempt
            .lock()
            .map_err(|_| ResolveError::Poisoned("instance cache entry"))?;
        if let Some(value) = entry.value.get() {
            debug!(contract = name, "resolved by concurrent caller");
            return Ok(Arc::clone(value));
        }
        if entry.failures.load(Ordering::SeqCst) != seen {
            if let Some(err) = last_failure.as_ref() {
                debug!(contract = name, error = %err, "concurrent resolution failed");
                return Err(err.clone());
            }
        }

        match init() {
            Ok(value) => {
                *last_failure = None;
                self.activations.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::clone(entry.value.get_or_init(|| Arc::new(value))))
            }
            Err(err) => {
                *last_failure = Some(err.clone());
                entry.failures.fetch_add(1, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn entry<T>(&self, key: TypeId, name: &str) -> ResolveResult<Arc<Entry<T>>>
    where
        T: Send + Sync + 'static,
    {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| ResolveError::Poisoned("instance cache"))?;
            let slot = slots
                .entry(key)
                .or_insert_with(|| -> Slot { Arc::new(Entry::<T>::new()) });
            Arc::clone(slot)
        };
        slot.downcast::<Entry<T>>()
            .map_err(|_| ResolveError::CacheTypeMismatch {
                contract: name.to_string(),
            })
    }

    /// Whether an instance has been created for `key`.
    pub fn contains<T: Send + Sync + 'static>(&self, key: TypeId) -> bool {
        let Ok(slots) = self.slots.lock() else {
            return false;
        };
        slots
            .get(&key)
            .and_then(|slot| slot.downcast_ref::<Entry<T>>())
            .is_some_and(|entry| entry.value.get().is_some())
    }

    /// Number of successful initializations so far.
    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("InstanceCache")
            .field("slots", &slots)
            .field("activations", &self.activation_count())
            .finish()
    }
}
