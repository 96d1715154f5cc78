//! Shared application state for Axum routers.

use std::time::Instant;

use vigil_storage::{CounterUpdater, ExclusivityEnforcer, QueryFacade, SharedStore};

/// Application-wide state shared across all routes.
///
/// Every service wraps the same record store, so a write through the
/// enforcer is immediately visible to the query facade.
#[derive(Clone)]
pub struct AppState {
    /// Backing record store (PostgreSQL or in-memory).
    pub store: SharedStore,
    /// Challenge create/update/delete with single-active enforcement.
    pub enforcer: ExclusivityEnforcer,
    /// Atomic prayer and progress increments.
    pub counters: CounterUpdater,
    /// Read-only access for list and get routes.
    pub queries: QueryFacade,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            enforcer: ExclusivityEnforcer::new(store.clone()),
            counters: CounterUpdater::new(store.clone()),
            queries: QueryFacade::new(store.clone()),
            store,
            start_time: Instant::now(),
        }
    }

    /// Uptime in whole seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(ExclusivityEnforcer, enforcer);
crate::impl_from_ref!(CounterUpdater, counters);
crate::impl_from_ref!(QueryFacade, queries);
