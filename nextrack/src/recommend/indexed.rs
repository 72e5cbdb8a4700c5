//! Precomputed per-user list strategy

use super::Recommender;
use async_trait::async_trait;
use nextrack_common::catalog;
use nextrack_common::store::ModelStore;
use nextrack_common::Result;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Looks up the user's precomputed candidate list in one named model
/// namespace and returns a uniformly random entry. No history filtering
/// here; repeat avoidance belongs to the session orchestrator. Absent or
/// empty lists delegate to the fallback.
pub struct Indexed {
    store: ModelStore,
    fallback: Arc<dyn Recommender>,
}

impl Indexed {
    pub fn new(store: ModelStore, fallback: Arc<dyn Recommender>) -> Self {
        Self { store, fallback }
    }
}

#[async_trait]
impl Recommender for Indexed {
    async fn recommend_next(&self, user: i64, prev_track: i64, prev_track_time: f64) -> Result<i64> {
        if let Some(raw) = self.store.get_raw(user).await? {
            let recommendations = catalog::decode_list(&raw)?;
            let choice = {
                let mut rng = rand::thread_rng();
                recommendations.choose(&mut rng).copied()
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
