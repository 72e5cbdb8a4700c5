//! Next-track recommendation endpoints

use super::ApiError;
use crate::datalog::Datum;
use crate::experiment::{Experiment, Treatment};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Request body for /next and /last: the track the user just heard and
/// how long they listened (fraction of track length).
#[derive(Debug, Deserialize)]
pub struct TrackEvent {
    pub track: i64,
    pub time: f64,
}

impl TrackEvent {
    fn validate(&self) -> Result<(), ApiError> {
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(ApiError::BadRequest(format!(
                "time must be a non-negative number, got {}",
                self.time
            )));
        }
        Ok(())
    }
}

/// Response: the next track for this user.
#[derive(Debug, Serialize)]
pub struct NextTrackResponse {
    pub user: i64,
    pub track: i64,
}

/// POST /next/:user
///
/// The recommendation endpoint. The experiment arm picks the
/// recommender: T1 gets the Dionis session recommender, Control the
/// baseline chain.
pub async fn next_track(
    State(state): State<AppState>,
    Path(user): Path<i64>,
    Json(event): Json<TrackEvent>,
) -> Result<Json<NextTrackResponse>, ApiError> {
    let start = Instant::now();
    event.validate()?;

    let treatment = Experiment::DIONIS.assign(user);
    let recommender = match treatment {
        Treatment::T1 => &state.session,
        Treatment::Control => &state.control,
    };

    let recommendation = recommender
        .recommend_next(user, event.track, event.time)
        .await?;

    debug!(
        user,
        prev_track = event.track,
        recommendation,
        treatment = ?treatment,
        "next track"
    );

    state
        .data_logger
        .log(
            "next",
            Datum::new(
                user,
                event.track,
                event.time,
                start.elapsed().as_secs_f64(),
                Some(recommendation),
            ),
        )
        .await;

    Ok(Json(NextTrackResponse {
        user,
        track: recommendation,
    }))
}

/// Response for the session-end signal.
#[derive(Debug, Serialize)]
pub struct LastTrackResponse {
    pub user: i64,
}

/// POST /last/:user
///
/// Session-end signal. Logged for offline analysis; no recommendation
/// is produced.
pub async fn last_track(
    State(state): State<AppState>,
    Path(user): Path<i64>,
    Json(event): Json<TrackEvent>,
) -> Result<Json<LastTrackResponse>, ApiError> {
    let start = Instant::now();
    event.validate()?;

    state
        .data_logger
        .log(
            "last",
            Datum::new(
                user,
                event.track,
                event.time,
                start.elapsed().as_secs_f64(),
                None,
            ),
        )
        .await;

    Ok(Json(LastTrackResponse { user }))
}
