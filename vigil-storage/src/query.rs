//! Read-only queries.

use vigil_core::{Challenge, Intention, RecordId, VigilResult};

use crate::record_store::{SharedStore, StoreStatistics};

/// Read side of the store. Lists are newest first.
#[derive(Clone)]
pub struct QueryFacade {
    store: SharedStore,
}

impl QueryFacade {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_intentions(&self) -> VigilResult<Vec<Intention>> {
        self.store.intention_list().await
    }

    pub async fn list_challenges(&self) -> VigilResult<Vec<Challenge>> {
        self.store.challenge_list().await
    }

    /// The single active challenge, or `None` when no challenge is active.
    pub async fn get_active_challenge(&self) -> VigilResult<Option<Challenge>> {
        self.store.challenge_get_active().await
    }

    pub async fn get_intention(&self, id: RecordId) -> VigilResult<Option<Intention>> {
        self.store.intention_get(id).await
    }

    pub async fn get_challenge(&self, id: RecordId) -> VigilResult<Option<Challenge>> {
        self.store.challenge_get(id).await
    }

    pub async fn statistics(&self) -> VigilResult<StoreStatistics> {
        self.store.statistics().await
    }

    /// Check that the underlying store is reachable.
    pub async fn health_check(&self) -> VigilResult<()> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStore, RecordStore};
    use std::sync::Arc;
    use vigil_core::{NewChallenge, NewIntention};

    #[tokio::test]
    async fn test_empty_store_queries() {
        let facade = QueryFacade::new(Arc::new(InMemoryStore::new()));

        assert!(facade.list_intentions().await.unwrap().is_empty());
        assert!(facade.list_challenges().await.unwrap().is_empty());
        assert!(facade.get_active_challenge().await.unwrap().is_none());
        assert!(facade.get_intention(1).await.unwrap().is_none());
        assert_eq!(facade.statistics().await.unwrap(), StoreStatistics::default());
        facade.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let facade = QueryFacade::new(store.clone());

        for content in ["first", "second", "third"] {
            store
                .intention_insert(&NewIntention::new(content, None, None).unwrap())
                .await
                .unwrap();
        }
        let contents: Vec<String> = facade
            .list_intentions()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.content)
            .collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_statistics_counts_rows() {
        let store = Arc::new(InMemoryStore::new());
        let facade = QueryFacade::new(store.clone());

        store
            .intention_insert(&NewIntention::new("x", None, None).unwrap())
            .await
            .unwrap();
        for active in [Some(true), Some(false), None] {
            store
                .challenge_insert(&NewChallenge::new("goal", "rosary", 5, active).unwrap())
                .await
                .unwrap();
        }

        let stats = facade.statistics().await.unwrap();
        assert_eq!(stats.intention_count, 1);
        assert_eq!(stats.challenge_count, 3);
        assert_eq!(stats.active_challenge_count, 1);
    }
}
