//! Active-challenge exclusivity.
//!
//! At most one challenge is active at any time. Every challenge write that
//! can change the active flag goes through [`ExclusivityEnforcer`]; the
//! store underneath performs the clear-others-then-apply sequence as one
//! atomic unit.

use vigil_core::{Challenge, ChallengeUpdate, NewChallenge, RecordId, VigilResult};

use crate::record_store::{ChallengeWrite, SharedStore};

/// Enforces the single-active-challenge invariant on create and update.
#[derive(Clone)]
pub struct ExclusivityEnforcer {
    store: SharedStore,
}

impl ExclusivityEnforcer {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a challenge. Unless `is_active` is explicitly false, the new
    /// challenge becomes the active one and displaces the previous one.
    pub async fn create_challenge(&self, new: NewChallenge) -> VigilResult<Challenge> {
        let write = self.store.challenge_insert(&new).await?;
        log_write("created", &write);
        Ok(write.challenge)
    }

    /// Merge a partial update. Setting `is_active = true` deactivates every
    /// other challenge, even when no other field changes. An empty update
    /// writes nothing and returns the stored row.
    pub async fn update_challenge(
        &self,
        id: RecordId,
        update: ChallengeUpdate,
    ) -> VigilResult<Option<Challenge>> {
        if update.is_empty() {
            return self.store.challenge_get(id).await;
        }
        let update = update.validated()?;
        let Some(write) = self.store.challenge_update(id, &update).await? else {
            return Ok(None);
        };
        log_write("updated", &write);
        Ok(Some(write.challenge))
    }

    /// Make `id` the active challenge.
    pub async fn activate(&self, id: RecordId) -> VigilResult<Option<Challenge>> {
        self.update_challenge(id, ChallengeUpdate::activation(true))
            .await
    }

    /// Delete a challenge. Deleting the active one leaves no active challenge.
    pub async fn delete_challenge(&self, id: RecordId) -> VigilResult<bool> {
        let removed = self.store.challenge_delete(id).await?;
        if removed {
            tracing::info!(challenge_id = id, "challenge deleted");
        }
        Ok(removed)
    }

    /// The single active challenge, if any.
    pub async fn get_active(&self) -> VigilResult<Option<Challenge>> {
        self.store.challenge_get_active().await
    }
}

fn log_write(action: &str, write: &ChallengeWrite) {
    if write.deactivated.is_empty() {
        tracing::debug!(
            challenge_id = write.challenge.id,
            is_active = write.challenge.is_active,
            "challenge {}",
            action
        );
    } else {
        tracing::info!(
            challenge_id = write.challenge.id,
            deactivated = ?write.deactivated,
            "challenge {} and activated",
            action
        );
    }
}
