//! Async record store trait.
//!
//! Every backend (the in-process `InMemoryStore` and the PostgreSQL client
//! in `vigil-api`) implements this one contract, so the consistency
//! services above it never know which storage they run against.

use ::async_trait::async_trait;
use std::sync::Arc;
use vigil_core::{
    Challenge, ChallengeUpdate, Intention, NewChallenge, NewIntention, PrayerKind, RecordId,
    VigilResult,
};

/// Result of a challenge create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeWrite {
    /// The challenge as stored after the write.
    pub challenge: Challenge,
    /// Ids of challenges that lost their active flag as part of the write.
    pub deactivated: Vec<RecordId>,
}

/// Row counts for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStatistics {
    pub intention_count: i64,
    pub challenge_count: i64,
    pub active_challenge_count: i64,
}

/// Storage contract for intentions and challenges.
///
/// Missing ids are reported as `Ok(None)` (or `Ok(false)` for deletes).
/// Lists are newest first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ========================================================================
    // INTENTION OPERATIONS
    // ========================================================================

    /// Insert a new intention with zeroed counters.
    async fn intention_insert(&self, new: &NewIntention) -> VigilResult<Intention>;

    /// Get an intention by ID.
    async fn intention_get(&self, id: RecordId) -> VigilResult<Option<Intention>>;

    /// List all intentions, newest first.
    async fn intention_list(&self) -> VigilResult<Vec<Intention>>;

    /// Add `delta` to one prayer counter as a single indivisible operation.
    async fn intention_increment(
        &self,
        id: RecordId,
        kind: PrayerKind,
        delta: i32,
    ) -> VigilResult<Option<Intention>>;

    /// Set `is_printed = true`.
    async fn intention_mark_printed(&self, id: RecordId) -> VigilResult<Option<Intention>>;

    // ========================================================================
    // CHALLENGE OPERATIONS
    // ========================================================================

    /// Insert a new challenge.
    ///
    /// When the new challenge is active, every other challenge is
    /// deactivated in the same atomic unit as the insert.
    async fn challenge_insert(&self, new: &NewChallenge) -> VigilResult<ChallengeWrite>;

    /// Get a challenge by ID.
    async fn challenge_get(&self, id: RecordId) -> VigilResult<Option<Challenge>>;

    /// List all challenges, newest first.
    async fn challenge_list(&self) -> VigilResult<Vec<Challenge>>;

    /// Merge the present fields of `update` into a challenge.
    ///
    /// When the update sets `is_active = true`, every other challenge is
    /// deactivated in the same atomic unit. An absent id changes nothing.
    async fn challenge_update(
        &self,
        id: RecordId,
        update: &ChallengeUpdate,
    ) -> VigilResult<Option<ChallengeWrite>>;

    /// Delete a challenge. Returns whether a row was removed.
    async fn challenge_delete(&self, id: RecordId) -> VigilResult<bool>;

    /// The single active challenge, if any.
    async fn challenge_get_active(&self) -> VigilResult<Option<Challenge>>;

    /// Add `delta` to `current_count` as a single indivisible operation.
    async fn challenge_increment(&self, id: RecordId, delta: i32) -> VigilResult<Option<Challenge>>;

    // ========================================================================
    // HEALTH & DIAGNOSTICS
    // ========================================================================

    /// Check that the backend is reachable.
    async fn health_check(&self) -> VigilResult<()>;

    /// Row counts across both tables.
    async fn statistics(&self) -> VigilResult<StoreStatistics>;
}

/// Shared handle to any store implementation.
pub type SharedStore = Arc<dyn RecordStore>;
