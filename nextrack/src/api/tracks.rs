//! Track metadata lookup

use super::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use nextrack_common::catalog::{self, Track};

/// GET /track/:track
///
/// Returns the stored metadata record for one track.
pub async fn get_track(
    State(state): State<AppState>,
    Path(track): Path<i64>,
) -> Result<Json<Track>, ApiError> {
    let raw = state
        .tracks
        .get_raw(track)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Track not found: {}", track)))?;

    let track = catalog::decode_track(&raw).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(track))
}
