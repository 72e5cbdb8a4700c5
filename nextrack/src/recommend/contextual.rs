//! Previous-track neighbor strategy

use super::Recommender;
use async_trait::async_trait;
use nextrack_common::catalog;
use nextrack_common::store::ModelStore;
use nextrack_common::Result;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Recommends a track related to the *previous* track (not the user):
/// the context namespace maps a track id to its precomputed neighbor
/// list. The full list is shuffled and the first entry returned, a
/// uniform choice over all neighbors. Absent or empty lists delegate to
/// the fallback.
pub struct Contextual {
    store: ModelStore,
    fallback: Arc<dyn Recommender>,
}

impl Contextual {
    pub fn new(store: ModelStore, fallback: Arc<dyn Recommender>) -> Self {
        Self { store, fallback }
    }
}

#[async_trait]
impl Recommender for Contextual {
    async fn recommend_next(&self, user: i64, prev_track: i64, prev_track_time: f64) -> Result<i64> {
        if let Some(raw) = self.store.get_raw(prev_track).await? {
            let mut neighbors = catalog::decode_list(&raw)?;
            let choice = {
                let mut rng = rand::thread_rng();
                neighbors.shuffle(&mut rng);
                neighbors.first().copied()
            };
            if let Some(track) = choice {
                return Ok(track);
            }
        }

        self.fallback
            .recommend_next(user, prev_track, prev_track_time)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextrack_common::store::{KvStore, MemoryStore};

    struct Fixed(i64);

    #[async_trait]
    impl Recommender for Fixed {
        async fn recommend_next(&self, _: i64, _: i64, _: f64) -> Result<i64> {
            Ok(self.0)
        }
    }

    async fn context_with(track: i64, neighbors: &[i64]) -> ModelStore {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let model = ModelStore::new(store, "contextual");
        model
            .put_raw(track, &catalog::encode_list(neighbors))
            .await
            .unwrap();
        model
    }

    #[tokio::test]
    async fn test_picks_a_neighbor_of_previous_track() {
        let contextual =
            Contextual::new(context_with(42, &[1, 2, 3]).await, Arc::new(Fixed(-1)));

        for _ in 0..30 {
            let track = contextual.recommend_next(7, 42, 0.5).await.unwrap();
            assert!([1, 2, 3].contains(&track));
        }
    }

    #[tokio::test]
    async fn test_unknown_previous_track_falls_back() {
        let contextual = Contextual::new(context_with(42, &[1]).await, Arc::new(Fixed(77)));
        assert_eq!(contextual.recommend_next(7, 43, 0.5).await.unwrap(), 77);
    }

    #[tokio::test]
    async fn test_empty_neighbor_list_falls_back() {
        let contextual = Contextual::new(context_with(42, &[]).await, Arc::new(Fixed(77)));
        assert_eq!(contextual.recommend_next(7, 42, 0.5).await.unwrap(), 77);
    }
}
