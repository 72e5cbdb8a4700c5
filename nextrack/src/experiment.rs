//! A/B experiment assignment
//!
//! Deterministic hash-based bucketing of a user id into a treatment arm.
//! The same user always lands in the same arm of a given experiment;
//! different experiment names salt the hash differently.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Treatment arms. Control keeps the baseline recommender, T1 gets the
/// candidate under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    Control,
    T1,
}

/// One named 50/50 experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    name: &'static str,
}

impl Experiment {
    /// The Dionis session recommender rollout.
    pub const DIONIS: Experiment = Experiment { name: "dionis" };

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Assign a user to an arm. Stable across calls and restarts.
    pub fn assign(&self, user: i64) -> Treatment {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        user.hash(&mut hasher);
        if hasher.finish() % 2 == 0 {
            Treatment::Control
        } else {
            Treatment::T1
        }
    }
}
