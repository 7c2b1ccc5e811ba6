//! Result cache capability consulted before a procedure is submitted.
//!
//! The controller only reads staleness; deciding it is the cache's job.
//! [`InMemoryResultCache`] makes that decision through an explicit
//! [`StalenessPolicy`] and an injectable clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::{ProcedurePayload, ProcedureRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResult {
    pub payload: ProcedurePayload,
    pub stale: bool,
}

/// Keyed result store shared between sessions. Implementations synchronise
/// internally.
pub trait ResultCache: Send + Sync {
    fn lookup(&self, request: &ProcedureRequest) -> Option<CachedResult>;
    fn store(&self, request: ProcedureRequest, payload: ProcedurePayload);
    fn invalidate(&self, request: &ProcedureRequest);
    /// Marks every entry of a project stale, e.g. after its configuration changed.
    fn invalidate_project(&self, project_id: &str);
    fn clear(&self);
}

/// A fresh cached result is reused; a missing or stale one means the
/// procedure should be (re)submitted.
pub fn is_advised_to_run(cache: &dyn ResultCache, request: &ProcedureRequest) -> bool {
    if !request.is_actionable() {
        return false;
    }
    cache.lookup(request).map_or(true, |cached| cached.stale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    /// Entries go stale only when invalidated.
    #[default]
    Manual,
    /// Entries go stale once older than the duration, or when invalidated.
    After(Duration),
}

impl StalenessPolicy {
    pub fn from_secs(stale_after_secs: Option<u64>) -> Self {
        match stale_after_secs {
            Some(secs) => StalenessPolicy::After(Duration::from_secs(secs)),
            None => StalenessPolicy::Manual,
        }
    }
}

pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug, Clone)]
struct Entry {
    payload: ProcedurePayload,
    stored_at: Instant,
    invalidated: bool,
}

pub struct InMemoryResultCache {
    policy: StalenessPolicy,
    clock: Clock,
    entries: Mutex<HashMap<ProcedureRequest, Entry>>,
}

impl InMemoryResultCache {
    pub fn new(policy: StalenessPolicy) -> Self {
        Self::with_clock(policy, Arc::new(Instant::now))
    }

    pub fn with_clock(policy: StalenessPolicy, clock: Clock) -> Self {
        Self {
            policy,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<ProcedureRequest, Entry>> {
        // Entries are plain data; a panicked writer cannot leave them half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, entry: &Entry) -> bool {
        if entry.invalidated {
            return true;
        }
        match self.policy {
            StalenessPolicy::Manual => false,
            StalenessPolicy::After(max_age) => {
                (self.clock)().saturating_duration_since(entry.stored_at) >= max_age
            }
        }
    }
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::new(StalenessPolicy::default())
    }
}

impl ResultCache for InMemoryResultCache {
    fn lookup(&self, request: &ProcedureRequest) -> Option<CachedResult> {
        let entries = self.entries();
        entries.get(request).map(|entry| CachedResult {
            payload: entry.payload.clone(),
            stale: self.is_stale(entry),
        })
    }

    fn store(&self, request: ProcedureRequest, payload: ProcedurePayload) {
        let stored_at = (self.clock)();
        self.entries().insert(
            request,
            Entry {
                payload,
                stored_at,
                invalidated: false,
            },
        );
    }

    fn invalidate(&self, request: &ProcedureRequest) {
        if let Some(entry) = self.entries().get_mut(request) {
            entry.invalidated = true;
        }
    }

    fn invalidate_project(&self, project_id: &str) {
        for (request, entry) in self.entries().iter_mut() {
            if request.project_id() == project_id {
                entry.invalidated = true;
            }
        }
    }

    fn clear(&self) {
        self.entries().clear();
    }
}
