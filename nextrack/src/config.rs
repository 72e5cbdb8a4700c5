//! Service configuration
//!
//! Loaded from a TOML file resolved via CLI argument, environment
//! variable, then the compiled default path. Every field has a default;
//! unknown keys are rejected so typos fail at startup instead of being
//! silently ignored.

use crate::recommend::DionisConfig;
use nextrack_common::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP listen address.
    pub bind_addr: String,

    /// Key-value store database file. Absent means an in-memory store
    /// (nothing survives a restart).
    pub store_path: Option<PathBuf>,

    /// Request data log (JSON lines).
    pub data_log_path: PathBuf,

    /// Track catalog file (JSON lines, one track per line).
    pub catalog_path: PathBuf,

    /// Global top-tracks ranking (JSON integer array). Absent disables
    /// the TopPop link in the control chain.
    pub top_tracks_path: Option<PathBuf>,

    /// Precomputed recommendation files, one per model namespace.
    pub recommendations: RecommendationFiles,

    /// Session recommender tuning.
    pub dionis: DionisConfig,
}

/// Per-model recommendation file paths. A model with no file simply has
/// no data in its namespace; requests against it resolve through
/// fallbacks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationFiles {
    pub lgcf: Option<PathBuf>,
    pub lfm: Option<PathBuf>,
    pub dssm: Option<PathBuf>,
    /// Track-keyed neighbor lists for the contextual strategy.
    pub contextual: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5001".to_string(),
            store_path: None,
            data_log_path: PathBuf::from("data/requests.log"),
            catalog_path: PathBuf::from("data/tracks.jsonl"),
            top_tracks_path: None,
            recommendations: RecommendationFiles::default(),
            dionis: DionisConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Startup validation; delegates to each component's own checks.
    pub fn validate(&self) -> Result<()> {
        self.dionis.validate()
    }
}
