//! Recommendation strategies
//!
//! Every strategy implements [`Recommender`] and composes through a
//! fallback: a strategy that cannot produce a candidate delegates to the
//! next one in its chain rather than retrying or answering empty. Chains
//! are built at startup and always terminate in [`Random`], which draws
//! from the full catalog and cannot come up empty, so a caller never
//! sees a "no recommendation" response.

use async_trait::async_trait;
use nextrack_common::Result;

mod contextual;
mod dionis;
mod indexed;
mod random;
mod toppop;

pub use contextual::Contextual;
pub use dionis::{DionisConfig, DionisRecommender, Method, MethodParams};
pub use indexed::Indexed;
pub use random::Random;
pub use toppop::TopPop;

/// The recommendation capability.
///
/// Given the track a user just heard and how long they listened (in
/// fractional units of the track length), produce the next track id.
/// Missing or empty model data is not an error; only store failures
/// surface as `Err`, failing the request.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend_next(&self, user: i64, prev_track: i64, prev_track_time: f64)
        -> Result<i64>;
}
