//! Atomic counter updates.
//!
//! Callers never read a counter, add to it, and write it back. They name
//! the counter and the delta, and the store applies `counter + delta` as a
//! single indivisible operation, so N concurrent increments always add N.

use vigil_core::{
    Challenge, Counter, Intention, PrayerKind, RecordId, ValidationError, VigilResult,
};

use crate::record_store::SharedStore;

/// Record returned by a generic counter increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountedRecord {
    Intention(Intention),
    Challenge(Challenge),
}

impl CountedRecord {
    pub fn id(&self) -> RecordId {
        match self {
            CountedRecord::Intention(i) => i.id,
            CountedRecord::Challenge(c) => c.id,
        }
    }

    /// Value of `counter` on this record, if the record owns it.
    pub fn value(&self, counter: Counter) -> Option<i32> {
        match (self, counter.prayer_kind()) {
            (CountedRecord::Intention(i), Some(kind)) => Some(i.count(kind)),
            (CountedRecord::Challenge(c), None) => Some(c.current_count),
            _ => None,
        }
    }
}

/// Applies increments to intention prayer counts and challenge progress.
#[derive(Clone)]
pub struct CounterUpdater {
    store: SharedStore,
}

impl CounterUpdater {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Add `delta` to `counter` on record `record_id`.
    ///
    /// `delta` must be at least 1. Returns `Ok(None)` when the record does
    /// not exist. Not idempotent: a retried call counts twice.
    pub async fn increment_counter(
        &self,
        record_id: RecordId,
        counter: Counter,
        delta: i32,
    ) -> VigilResult<Option<CountedRecord>> {
        if delta < 1 {
            return Err(ValidationError::out_of_range(
                "amount",
                "must be greater than or equal to 1",
            )
            .into());
        }

        let updated = match counter.prayer_kind() {
            Some(kind) => self
                .store
                .intention_increment(record_id, kind, delta)
                .await?
                .map(CountedRecord::Intention),
            None => self
                .store
                .challenge_increment(record_id, delta)
                .await?
                .map(CountedRecord::Challenge),
        };

        match &updated {
            Some(record) => tracing::debug!(
                record_id = record.id(),
                counter = %counter,
                delta,
                value = record.value(counter),
                "counter incremented"
            ),
            None => tracing::debug!(record_id, counter = %counter, "counter target not found"),
        }
        Ok(updated)
    }

    /// Count one prayer of `kind` for an intention.
    pub async fn pray(&self, intention_id: RecordId, kind: PrayerKind) -> VigilResult<Option<Intention>> {
        let record = self
            .increment_counter(intention_id, Counter::from(kind), 1)
            .await?;
        Ok(match record {
            Some(CountedRecord::Intention(intention)) => Some(intention),
            _ => None,
        })
    }

    /// Add `amount` to a challenge's running count.
    pub async fn advance_challenge(
        &self,
        challenge_id: RecordId,
        amount: i32,
    ) -> VigilResult<Option<Challenge>> {
        let record = self
            .increment_counter(challenge_id, Counter::ChallengeProgress, amount)
            .await?;
        Ok(match record {
            Some(CountedRecord::Challenge(challenge)) => Some(challenge),
            _ => None,
        })
    }

    /// Mark an intention as printed. Repeating the call is harmless.
    pub async fn mark_printed(&self, intention_id: RecordId) -> VigilResult<Option<Intention>> {
        let updated = self.store.intention_mark_printed(intention_id).await?;
        if updated.is_some() {
            tracing::debug!(intention_id, "intention marked printed");
        }
        Ok(updated)
    }
}
