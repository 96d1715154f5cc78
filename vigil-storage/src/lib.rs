//! Vigil Storage - Store Trait and Consistency Services
//!
//! Defines the record store abstraction, an in-process implementation, and
//! the services that keep counters and the active-challenge flag consistent.
//! The PostgreSQL implementation lives in vigil-api.

pub mod counter;
pub mod exclusivity;
pub mod memory;
pub mod query;
pub mod record_store;

pub use counter::{CountedRecord, CounterUpdater};
pub use exclusivity::ExclusivityEnforcer;
pub use memory::InMemoryStore;
pub use query::QueryFacade;
pub use record_store::{ChallengeWrite, RecordStore, SharedStore, StoreStatistics};
