//! Global popularity strategy

use super::Recommender;
use async_trait::async_trait;
use nextrack_common::{Error, Result};
use rand::seq::SliceRandom;
use std::path::Path;
use std::sync::Arc;

/// Draws uniformly from a fixed, externally supplied ranked list of
/// globally popular tracks. An empty list (misconfiguration) delegates
/// to the fallback.
pub struct TopPop {
    top_tracks: Vec<i64>,
    fallback: Arc<dyn Recommender>,
}

impl TopPop {
    pub fn new(top_tracks: Vec<i64>, fallback: Arc<dyn Recommender>) -> Self {
        Self {
            top_tracks,
            fallback,
        }
    }

    /// Load the ranked list from a JSON file containing an integer array.
    pub fn load_from_json(path: &Path) -> Result<Vec<i64>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Cannot read top tracks file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Bad top tracks file {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl Recommender for TopPop {
    async fn recommend_next(&self, user: i64, prev_track: i64, prev_track_time: f64) -> Result<i64> {
        let choice = {
            let mut rng = rand::thread_rng();
            self.top_tracks.choose(&mut rng).copied()
        };

        match choice {
            Some(track) => Ok(track),
            None => {
                self.fallback
                    .recommend_next(user, prev_track, prev_track_time)
                    .await
            }
        }
    }
}
