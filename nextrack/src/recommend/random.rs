//! Terminal uniform-random strategy

use super::Recommender;
use async_trait::async_trait;
use nextrack_common::catalog::Catalog;
use nextrack_common::{Error, Result};
use rand::seq::SliceRandom;

/// Draws uniformly from the full catalog. Terminal strategy: every
/// fallback chain bottoms out here, so construction rejects an empty
/// catalog instead of letting requests fail later.
pub struct Random {
    track_ids: Vec<i64>,
}

impl Random {
    pub fn new(catalog: &Catalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::Config(
                "Random recommender requires a non-empty catalog".to_string(),
            ));
        }
        Ok(Self {
            track_ids: catalog.track_ids(),
        })
    }
}

#[async_trait]
impl Recommender for Random {
    async fn recommend_next(
        &self,
        _user: i64,
        _prev_track: i64,
        _prev_track_time: f64,
    ) -> Result<i64> {
        let track = {
            let mut rng = rand::thread_rng();
            *self
                .track_ids
                .choose(&mut rng)
                .ok_or_else(|| Error::Internal("empty track universe".to_string()))?
        };
        Ok(track)
    }
}
