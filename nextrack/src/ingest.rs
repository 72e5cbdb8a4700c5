//! Startup ingestion
//!
//! Bulk-uploads the track catalog and the precomputed per-model
//! recommendation files into the key-value store. Uploads are batched
//! through `set_many` so startup does not issue one store round trip per
//! record.

use nextrack_common::catalog::{self, Catalog};
use nextrack_common::store::ModelStore;
use nextrack_common::{Error, Result};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Records per batched write.
const UPLOAD_BATCH: usize = 1000;

/// Upload every catalog track's metadata record under the tracks
/// namespace, keyed by track id.
pub async fn upload_tracks(catalog: &Catalog, store: &ModelStore) -> Result<()> {
    let mut batch = Vec::with_capacity(UPLOAD_BATCH);
    let mut uploaded = 0usize;

    for track in catalog.tracks() {
        batch.push((track.track, catalog::encode_track(track)?));
        if batch.len() == UPLOAD_BATCH {
            store.put_many(&batch).await?;
            uploaded += batch.len();
            batch.clear();
        }
    }
    if !batch.is_empty() {
        store.put_many(&batch).await?;
        uploaded += batch.len();
    }

    info!("Uploaded {} tracks to '{}'", uploaded, store.name());
    Ok(())
}

/// One line of a recommendations file: candidates precomputed for a user
/// (user-keyed models) or for a track (context models).
#[derive(Deserialize)]
struct RecommendationRecord {
    user: Option<i64>,
    track: Option<i64>,
    recommendations: Vec<i64>,
}

/// Which field of the recommendations file keys each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    User,
    Track,
}

/// Upload a JSON-lines recommendations file into one model namespace.
pub async fn upload_recommendations(
    path: &Path,
    store: &ModelStore,
    key: RecordKey,
) -> Result<()> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Config(format!(
            "Cannot open recommendations file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut batch = Vec::with_capacity(UPLOAD_BATCH);
    let mut uploaded = 0usize;

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: RecommendationRecord = serde_json::from_str(&line).map_err(|e| {
            Error::Config(format!(
                "Bad recommendation record at {}:{}: {}",
                path.display(),
                lineno + 1,
                e
            ))
        })?;

        let record_key = match key {
            RecordKey::User => record.user,
            RecordKey::Track => record.track,
        }
        .ok_or_else(|| {
            Error::Config(format!(
                "Recommendation record at {}:{} is missing its key field",
                path.display(),
                lineno + 1
            ))
        })?;

        batch.push((record_key, catalog::encode_list(&record.recommendations)));
        if batch.len() == UPLOAD_BATCH {
            store.put_many(&batch).await?;
            uploaded += batch.len();
            batch.clear();
        }
    }
    if !batch.is_empty() {
        store.put_many(&batch).await?;
        uploaded += batch.len();
    }

    info!(
        "Uploaded {} recommendation lists from {} to '{}'",
        uploaded,
        path.display(),
        store.name()
    );
    Ok(())
}
