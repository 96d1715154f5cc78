//! In-process record store.
//!
//! Each table sits behind its own `RwLock`. Every mutation completes under a
//! single write guard, which is what makes increments and exclusive
//! activation atomic here. Guards are never held across an `.await`.

use ::async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use vigil_core::{
    checked_increment, now, Challenge, ChallengeUpdate, Counter, Intention, NewChallenge,
    NewIntention, PrayerKind, RecordId, StorageError, Timestamp, VigilError, VigilResult,
};

use crate::record_store::{ChallengeWrite, RecordStore, StoreStatistics};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    last_id: RecordId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory store for the no-database mode and for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    intentions: RwLock<Table<Intention>>,
    challenges: RwLock<Table<Challenge>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every row and reset id generation.
    pub fn clear(&self) -> VigilResult<()> {
        *write(&self.intentions)? = Table::default();
        *write(&self.challenges)? = Table::default();
        Ok(())
    }

    /// Get count of stored intentions.
    pub fn intention_count(&self) -> VigilResult<usize> {
        Ok(read(&self.intentions)?.rows.len())
    }

    /// Get count of stored challenges.
    pub fn challenge_count(&self) -> VigilResult<usize> {
        Ok(read(&self.challenges)?.rows.len())
    }
}

fn read<T>(lock: &RwLock<T>) -> VigilResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| VigilError::Storage(StorageError::LockPoisoned))
}

fn write<T>(lock: &RwLock<T>) -> VigilResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| VigilError::Storage(StorageError::LockPoisoned))
}

fn newest_first<T: Clone>(rows: &BTreeMap<RecordId, T>, created_at: fn(&T) -> Timestamp) -> Vec<T> {
    let mut out: Vec<(RecordId, T)> = rows.iter().map(|(id, r)| (*id, r.clone())).collect();
    out.sort_by(|(a_id, a), (b_id, b)| {
        created_at(b)
            .cmp(&created_at(a))
            .then_with(|| b_id.cmp(a_id))
    });
    out.into_iter().map(|(_, r)| r).collect()
}

/// Clear the active flag on every challenge except `keep`.
fn deactivate_others(table: &mut Table<Challenge>, keep: RecordId) -> Vec<RecordId> {
    table
        .rows
        .values_mut()
        .filter(|c| c.is_active && c.id != keep)
        .map(|c| {
            c.is_active = false;
            c.id
        })
        .collect()
}

#[async_trait]
impl RecordStore for InMemoryStore {
    // === Intention Operations ===

    async fn intention_insert(&self, new: &NewIntention) -> VigilResult<Intention> {
        let mut table = write(&self.intentions)?;
        let id = table.next_id();
        let intention = Intention::from_new(id, new, now());
        table.rows.insert(id, intention.clone());
        tracing::debug!(intention_id = id, "intention inserted");
        Ok(intention)
    }

    async fn intention_get(&self, id: RecordId) -> VigilResult<Option<Intention>> {
        Ok(read(&self.intentions)?.rows.get(&id).cloned())
    }

    async fn intention_list(&self) -> VigilResult<Vec<Intention>> {
        let table = read(&self.intentions)?;
        Ok(newest_first(&table.rows, |i| i.created_at))
    }

    async fn intention_increment(
        &self,
        id: RecordId,
        kind: PrayerKind,
        delta: i32,
    ) -> VigilResult<Option<Intention>> {
        let mut table = write(&self.intentions)?;
        let Some(intention) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        checked_increment(intention.count_mut(kind), Counter::from(kind), delta)?;
        Ok(Some(intention.clone()))
    }

    async fn intention_mark_printed(&self, id: RecordId) -> VigilResult<Option<Intention>> {
        let mut table = write(&self.intentions)?;
        Ok(table.rows.get_mut(&id).map(|intention| {
            intention.is_printed = true;
            intention.clone()
        }))
    }

    // === Challenge Operations ===

    async fn challenge_insert(&self, new: &NewChallenge) -> VigilResult<ChallengeWrite> {
        let mut table = write(&self.challenges)?;
        let id = table.next_id();
        let challenge = Challenge::from_new(id, new, now());
        let deactivated = if challenge.is_active {
            deactivate_others(&mut table, id)
        } else {
            Vec::new()
        };
        table.rows.insert(id, challenge.clone());
        Ok(ChallengeWrite {
            challenge,
            deactivated,
        })
    }

    async fn challenge_get(&self, id: RecordId) -> VigilResult<Option<Challenge>> {
        Ok(read(&self.challenges)?.rows.get(&id).cloned())
    }

    async fn challenge_list(&self) -> VigilResult<Vec<Challenge>> {
        let table = read(&self.challenges)?;
        Ok(newest_first(&table.rows, |c| c.created_at))
    }

    async fn challenge_update(
        &self,
        id: RecordId,
        update: &ChallengeUpdate,
    ) -> VigilResult<Option<ChallengeWrite>> {
        let mut table = write(&self.challenges)?;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        let deactivated = if update.activates() {
            deactivate_others(&mut table, id)
        } else {
            Vec::new()
        };
        let Some(challenge) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        challenge.apply(update);
        Ok(Some(ChallengeWrite {
            challenge: challenge.clone(),
            deactivated,
        }))
    }

    async fn challenge_delete(&self, id: RecordId) -> VigilResult<bool> {
        Ok(write(&self.challenges)?.rows.remove(&id).is_some())
    }

    async fn challenge_get_active(&self) -> VigilResult<Option<Challenge>> {
        let table = read(&self.challenges)?;
        Ok(table.rows.values().find(|c| c.is_active).cloned())
    }

    async fn challenge_increment(&self, id: RecordId, delta: i32) -> VigilResult<Option<Challenge>> {
        let mut table = write(&self.challenges)?;
        let Some(challenge) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        checked_increment(&mut challenge.current_count, Counter::ChallengeProgress, delta)?;
        Ok(Some(challenge.clone()))
    }

    // === Health & Diagnostics ===

    async fn health_check(&self) -> VigilResult<()> {
        drop(read(&self.intentions)?);
        drop(read(&self.challenges)?);
        Ok(())
    }

    async fn statistics(&self) -> VigilResult<StoreStatistics> {
        let intentions = read(&self.intentions)?;
        let challenges = read(&self.challenges)?;
        Ok(StoreStatistics {
            intention_count: intentions.rows.len() as i64,
            challenge_count: challenges.rows.len() as i64,
            active_challenge_count: challenges.rows.values().filter(|c| c.is_active).count() as i64,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::ValidationError;

    fn new_intention(content: &str) -> NewIntention {
        NewIntention::new(content, None, None).unwrap()
    }

    fn new_challenge(title: &str, is_active: Option<bool>) -> NewChallenge {
        NewChallenge::new(title, "rosary", 100, is_active).unwrap()
    }

    // ========================================================================
    // Intention Tests
    // ========================================================================

    #[tokio::test]
    async fn test_intention_insert_get() {
        let store = InMemoryStore::new();
        let inserted = store.intention_insert(&new_intention("Healing")).await.unwrap();

        assert_eq!(inserted.id, 1);
        let fetched = store.intention_get(inserted.id).await.unwrap();
        assert_eq!(fetched, Some(inserted));
    }

    #[tokio::test]
    async fn test_intention_ids_increase() {
        let store = InMemoryStore::new();
        let a = store.intention_insert(&new_intention("a")).await.unwrap();
        let b = store.intention_insert(&new_intention("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_intention_list_newest_first() {
        let store = InMemoryStore::new();
        for content in ["first", "second", "third"] {
            store.intention_insert(&new_intention(content)).await.unwrap();
        }
        let contents: Vec<String> = store
            .intention_list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.content)
            .collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_intention_increment_touches_one_counter() {
        let store = InMemoryStore::new();
        let intention = store.intention_insert(&new_intention("Peace")).await.unwrap();

        let updated = store
            .intention_increment(intention.id, PrayerKind::OurFather, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.our_father_count, 1);
        assert_eq!(updated.hail_mary_count, 0);
        assert_eq!(updated.rosary_count, 0);
    }

    #[tokio::test]
    async fn test_intention_increment_not_found() {
        let store = InMemoryStore::new();
        let result = store.intention_increment(99, PrayerKind::HailMary, 1).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_intention_increment_overflow_leaves_counter() {
        let store = InMemoryStore::new();
        let intention = store.intention_insert(&new_intention("Peace")).await.unwrap();
        store
            .intention_increment(intention.id, PrayerKind::Rosary, i32::MAX)
            .await
            .unwrap();

        let err = store
            .intention_increment(intention.id, PrayerKind::Rosary, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VigilError::Validation(ValidationError::OutOfRange { .. })
        ));
        let current = store.intention_get(intention.id).await.unwrap().unwrap();
        assert_eq!(current.rosary_count, i32::MAX);
    }

    #[tokio::test]
    async fn test_intention_mark_printed() {
        let store = InMemoryStore::new();
        let intention = store.intention_insert(&new_intention("Exams")).await.unwrap();
        assert!(!intention.is_printed);

        let printed = store.intention_mark_printed(intention.id).await.unwrap().unwrap();
        assert!(printed.is_printed);
        assert!(store.intention_mark_printed(1234).await.unwrap().is_none());
    }

    // ========================================================================
    // Challenge Tests
    // ========================================================================

    #[tokio::test]
    async fn test_challenge_insert_active_displaces_previous() {
        let store = InMemoryStore::new();
        let first = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();
        assert!(first.deactivated.is_empty());

        let second = store.challenge_insert(&new_challenge("Week 2", None)).await.unwrap();
        assert_eq!(second.deactivated, vec![first.challenge.id]);

        let active = store.challenge_get_active().await.unwrap().unwrap();
        assert_eq!(active.id, second.challenge.id);
        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.active_challenge_count, 1);
    }

    #[tokio::test]
    async fn test_challenge_insert_inactive_keeps_previous() {
        let store = InMemoryStore::new();
        let first = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();
        let draft = store
            .challenge_insert(&new_challenge("Draft", Some(false)))
            .await
            .unwrap();

        assert!(draft.deactivated.is_empty());
        assert!(!draft.challenge.is_active);
        let active = store.challenge_get_active().await.unwrap().unwrap();
        assert_eq!(active.id, first.challenge.id);
    }

    #[tokio::test]
    async fn test_challenge_update_missing_changes_nothing() {
        let store = InMemoryStore::new();
        let first = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();

        let result = store
            .challenge_update(999, &ChallengeUpdate::activation(true))
            .await
            .unwrap();
        assert!(result.is_none());
        let active = store.challenge_get_active().await.unwrap().unwrap();
        assert_eq!(active.id, first.challenge.id);
    }

    #[tokio::test]
    async fn test_challenge_update_merges_fields() {
        let store = InMemoryStore::new();
        let created = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();

        let update = ChallengeUpdate {
            title: Some("Week One".to_string()),
            total_target: Some(250),
            ..ChallengeUpdate::default()
        };
        let written = store
            .challenge_update(created.challenge.id, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(written.challenge.title, "Week One");
        assert_eq!(written.challenge.total_target, 250);
        assert_eq!(written.challenge.prayer_type, "rosary");
        assert!(written.challenge.is_active);
    }

    #[tokio::test]
    async fn test_challenge_delete() {
        let store = InMemoryStore::new();
        let created = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();

        assert!(store.challenge_delete(created.challenge.id).await.unwrap());
        assert!(!store.challenge_delete(created.challenge.id).await.unwrap());
        assert!(store.challenge_get_active().await.unwrap().is_none());
        assert!(store.challenge_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_challenge_increment() {
        let store = InMemoryStore::new();
        let created = store.challenge_insert(&new_challenge("Week 1", None)).await.unwrap();

        let updated = store
            .challenge_increment(created.challenge.id, 7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.current_count, 7);
        assert!(store.challenge_increment(42, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_health_check_releases_locks() {
        let store = InMemoryStore::new();
        store.health_check().await.unwrap();

        let created = store.challenge_insert(&new_challenge("after", None)).await.unwrap();
        assert!(created.challenge.is_active);
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let store = InMemoryStore::new();
        store.intention_insert(&new_intention("a")).await.unwrap();
        store.challenge_insert(&new_challenge("b", None)).await.unwrap();
        store.clear().unwrap();

        assert_eq!(store.intention_count().unwrap(), 0);
        assert_eq!(store.challenge_count().unwrap(), 0);
        let again = store.intention_insert(&new_intention("c")).await.unwrap();
        assert_eq!(again.id, 1);
    }
}
