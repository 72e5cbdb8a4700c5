//! Dionis session recommender
//!
//! Stateful per-user orchestrator. Keeps a bounded history of the tracks
//! a user has been shown and a small state machine that cycles between
//! precomputed recommendation models: stay with a model while listens
//! run long, rotate to the next model in the cycle after enough
//! consecutive short listens, and always fall through to a safety-net
//! chain so the user is never left without an answer.
//!
//! Session state is read-modify-written on every call with no cross-call
//! isolation: two concurrent requests for the same user can both read
//! stale state and independently decide a transition, losing one update
//! or switching twice. Accepted, given the low concurrency of a single
//! listening session. Each of the two state writes (history append+trim,
//! method+failcount) is batched and atomic as a unit.

use super::Recommender;
use async_trait::async_trait;
use nextrack_common::catalog;
use nextrack_common::store::{KvStore, ModelStore};
use nextrack_common::{Error, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The model cycle: `lgcf -> lfm -> lgcf_m -> dssm -> lgcf -> ...`
///
/// `lgcf_m` is a deliberate "reset" step: it participates in the cycle
/// but never has a registered model namespace, so while it is active
/// every call goes straight to the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Lgcf,
    Lfm,
    LgcfM,
    Dssm,
}

impl Method {
    /// The method a brand-new user starts with.
    pub fn first() -> Self {
        Method::Lgcf
    }

    /// The configured next step in the fixed cycle, ignoring flags.
    pub fn next_in_cycle(self) -> Self {
        match self {
            Method::Lgcf => Method::Lfm,
            Method::Lfm => Method::LgcfM,
            Method::LgcfM => Method::Dssm,
            Method::Dssm => Method::Lgcf,
        }
    }

    /// Stable name used as the store key value and model namespace name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Lgcf => "lgcf",
            Method::Lfm => "lfm",
            Method::LgcfM => "lgcf_m",
            Method::Dssm => "dssm",
        }
    }

    fn parse(name: &str) -> Result<Self> {
        match name {
            "lgcf" => Ok(Method::Lgcf),
            "lfm" => Ok(Method::Lfm),
            "lgcf_m" => Ok(Method::LgcfM),
            "dssm" => Ok(Method::Dssm),
            other => Err(Error::Internal(format!(
                "corrupt session state: unknown method '{}'",
                other
            ))),
        }
    }
}

/// One value per cycle method. A fixed record instead of a string-keyed
/// map: unknown or missing method names fail deserialization at startup
/// instead of panicking at lookup time.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodParams<T> {
    pub lgcf: T,
    pub lfm: T,
    pub lgcf_m: T,
    pub dssm: T,
}

impl<T: Copy> MethodParams<T> {
    pub fn get(&self, method: Method) -> T {
        match method {
            Method::Lgcf => self.lgcf,
            Method::Lfm => self.lfm,
            Method::LgcfM => self.lgcf_m,
            Method::Dssm => self.dssm,
        }
    }
}

/// Tuning parameters for the session recommender.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DionisConfig {
    /// Top-K window the indexed pick samples from (over the filtered list).
    pub indexed_sample_size: usize,
    /// Cycle step flags; `lgcf` itself is always enabled.
    pub use_lfm: bool,
    pub use_lgcf_m: bool,
    pub use_dssm: bool,
    /// Minimum `prev_track_time` counting as a success, per method.
    pub thresholds: MethodParams<f64>,
    /// Consecutive failures required before switching away, per method.
    pub back_counts: MethodParams<u32>,
    /// Sliding-window cap on per-user history.
    pub max_history_length: usize,
}

impl Default for DionisConfig {
    fn default() -> Self {
        Self {
            indexed_sample_size: 15,
            use_lfm: true,
            use_lgcf_m: true,
            use_dssm: true,
            thresholds: MethodParams {
                lgcf: 0.35,
                lfm: 0.30,
                lgcf_m: 0.35,
                dssm: 0.30,
            },
            back_counts: MethodParams {
                lgcf: 4,
                lfm: 2,
                lgcf_m: 4,
                dssm: 2,
            },
            max_history_length: 100,
        }
    }
}

impl DionisConfig {
    /// Startup validation. A config that passes here cannot degenerate
    /// into an unanswerable request later.
    pub fn validate(&self) -> Result<()> {
        if self.indexed_sample_size == 0 {
            return Err(Error::Config(
                "indexed_sample_size must be at least 1".to_string(),
            ));
        }
        for method in [Method::Lgcf, Method::Lfm, Method::LgcfM, Method::Dssm] {
            let threshold = self.thresholds.get(method);
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::Config(format!(
                    "threshold for {} must be a non-negative finite number",
                    method.as_str()
                )));
            }
            if self.back_counts.get(method) == 0 {
                return Err(Error::Config(format!(
                    "back_count for {} must be at least 1",
                    method.as_str()
                )));
            }
        }
        Ok(())
    }
}

fn history_key(user: i64) -> String {
    format!("user:{}:hist:tracks", user)
}

fn method_key(user: i64) -> String {
    format!("user:{}:state:method", user)
}

fn failcount_key(user: i64) -> String {
    format!("user:{}:state:failcount", user)
}

/// The session orchestrator. See the module docs for the state model.
pub struct DionisRecommender {
    sessions: Arc<dyn KvStore>,
    /// Model namespaces for the indexed pick. Which methods are
    /// registered here is a deployment choice; an active method with no
    /// entry delegates straight to the fallback chain.
    models: HashMap<Method, ModelStore>,
    fallback: Arc<dyn Recommender>,
    config: DionisConfig,
}

impl DionisRecommender {
    pub fn new(
        sessions: Arc<dyn KvStore>,
        models: HashMap<Method, ModelStore>,
        fallback: Arc<dyn Recommender>,
        config: DionisConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sessions,
            models,
            fallback,
            config,
        })
    }

    /// Current `(method, fail_count)` for a user; first contact yields
    /// `(first method, 0)`.
    async fn load_state(&self, user: i64) -> Result<(Method, u32)> {
        let method_raw = self.sessions.get(&method_key(user)).await?;
        let failcount_raw = self.sessions.get(&failcount_key(user)).await?;

        let (Some(method_raw), Some(failcount_raw)) = (method_raw, failcount_raw) else {
            return Ok((Method::first(), 0));
        };

        let method_name = String::from_utf8(method_raw)
            .map_err(|_| Error::Internal("corrupt session state: non-UTF8 method".to_string()))?;
        let method = Method::parse(&method_name)?;

        let fail_count = String::from_utf8(failcount_raw)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                Error::Internal("corrupt session state: bad fail count".to_string())
            })?;

        Ok((method, fail_count))
    }

    /// Write back `(method, fail_count)` as one batched store write.
    async fn store_state(&self, user: i64, method: Method, fail_count: u32) -> Result<()> {
        self.sessions
            .set_many(&[
                (method_key(user), method.as_str().as_bytes().to_vec()),
                (failcount_key(user), fail_count.to_string().into_bytes()),
            ])
            .await
    }

    /// Whether the configured next cycle step is enabled. No skip-ahead:
    /// when the successor is disabled the switch simply does not happen
    /// and the fail count keeps accumulating.
    fn switch_target(&self, method: Method) -> Option<Method> {
        let next = method.next_in_cycle();
        let enabled = match next {
            Method::Lgcf => true,
            Method::Lfm => self.config.use_lfm,
            Method::LgcfM => self.config.use_lgcf_m,
            Method::Dssm => self.config.use_dssm,
        };
        enabled.then_some(next)
    }

    /// Indexed pick: the user's precomputed list for `model`, minus
    /// everything in the seen set, sampled uniformly from the first
    /// `indexed_sample_size` entries of the filtered list. `None` when
    /// the store has no entry, the list is empty, or filtering removes
    /// everything.
    async fn pick_indexed(
        &self,
        model: &ModelStore,
        user: i64,
        seen: &HashSet<i64>,
    ) -> Result<Option<i64>> {
        let Some(raw) = model.get_raw(user).await? else {
            return Ok(None);
        };

        let unseen: Vec<i64> = catalog::decode_list(&raw)?
            .into_iter()
            .filter(|track| !seen.contains(track))
            .collect();
        if unseen.is_empty() {
            return Ok(None);
        }

        let window = &unseen[..unseen.len().min(self.config.indexed_sample_size)];
        let pick = {
            let mut rng = rand::thread_rng();
            window.choose(&mut rng).copied()
        };
        Ok(pick)
    }
}

#[async_trait]
impl Recommender for DionisRecommender {
    async fn recommend_next(&self, user: i64, prev_track: i64, prev_track_time: f64) -> Result<i64> {
        // Record the previous track; append-then-trim so the newest
        // entry is never evicted by its own insertion.
        self.sessions
            .list_append_trim(
                &history_key(user),
                prev_track,
                self.config.max_history_length,
            )
            .await?;

        // The trim bound also bounds repeat-avoidance memory: exposures
        // older than the window can resurface.
        let seen: HashSet<i64> = self
            .sessions
            .list_range(&history_key(user))
            .await?
            .into_iter()
            .collect();

        let (method, fail_count) = self.load_state(user).await?;

        // Short listens count against the currently active method,
        // regardless of which strategy produced the previous track.
        let mut fail_count = if prev_track_time < self.config.thresholds.get(method) {
            fail_count + 1
        } else {
            0
        };

        let mut method = method;
        if fail_count >= self.config.back_counts.get(method) {
            if let Some(next) = self.switch_target(method) {
                method = next;
                fail_count = 0;
            }
        }

        self.store_state(user, method, fail_count).await?;

        if let Some(model) = self.models.get(&method) {
            if let Some(track) = self.pick_indexed(model, user, &seen).await? {
                return Ok(track);
            }
        }

        self.fallback
            .recommend_next(user, prev_track, prev_track_time)
            .await
    }
}
