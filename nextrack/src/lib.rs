//! nextrack library - next-track music recommendation service
//!
//! Wires the recommendation strategies into the two serving chains (the
//! Dionis session recommender for the T1 arm, the contextual baseline
//! for Control) and exposes them over a small HTTP API.

use axum::routing::{get, post};
use axum::Router;
use nextrack_common::catalog::Catalog;
use nextrack_common::store::{KvStore, ModelStore};
use nextrack_common::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod datalog;
pub mod experiment;
pub mod ingest;
pub mod recommend;

use datalog::DataLogger;
use recommend::{
    Contextual, DionisConfig, DionisRecommender, Indexed, Method, Random, Recommender, TopPop,
};

/// Namespace holding track metadata records, keyed by track id.
pub const TRACKS_NAMESPACE: &str = "tracks";
/// Namespace holding per-track neighbor lists for the contextual strategy.
pub const CONTEXT_NAMESPACE: &str = "contextual";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Track metadata namespace (serves /track/:id)
    pub tracks: ModelStore,
    /// T1 arm: the Dionis session recommender
    pub session: Arc<dyn Recommender>,
    /// Control arm: the baseline fallback chain
    pub control: Arc<dyn Recommender>,
    /// Request data log
    pub data_logger: Arc<DataLogger>,
}

/// Build the two serving chains over one shared store.
///
/// Wiring: the session recommender runs over the lgcf, lfm and dssm
/// model namespaces (lgcf_m stays unregistered, acting as a reset step)
/// with an Indexed-over-lgcf then Random fallback; the control arm is
/// Contextual, then TopPop over the supplied ranking, then Random.
pub fn build_recommenders(
    store: Arc<dyn KvStore>,
    catalog: &Arc<Catalog>,
    top_tracks: Vec<i64>,
    dionis_config: DionisConfig,
) -> Result<(Arc<dyn Recommender>, Arc<dyn Recommender>)> {
    let random: Arc<dyn Recommender> = Arc::new(Random::new(catalog)?);

    let session_fallback: Arc<dyn Recommender> = Arc::new(Indexed::new(
        ModelStore::new(store.clone(), Method::Lgcf.as_str()),
        random.clone(),
    ));

    let mut models = HashMap::new();
    for method in [Method::Lgcf, Method::Lfm, Method::Dssm] {
        models.insert(method, ModelStore::new(store.clone(), method.as_str()));
    }

    let session: Arc<dyn Recommender> = Arc::new(DionisRecommender::new(
        store.clone(),
        models,
        session_fallback,
        dionis_config,
    )?);

    let toppop: Arc<dyn Recommender> = Arc::new(TopPop::new(top_tracks, random.clone()));
    let control: Arc<dyn Recommender> = Arc::new(Contextual::new(
        ModelStore::new(store, CONTEXT_NAMESPACE),
        toppop,
    ));

    Ok((session, control))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::hello))
        .route("/health", get(api::health_check))
        .route("/track/:track", get(api::get_track))
        .route("/next/:user", post(api::next_track))
        .route("/last/:user", post(api::last_track))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
