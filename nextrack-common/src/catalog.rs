//! Track catalog
//!
//! Decodes stored byte payloads into track metadata records and ordered
//! recommendation lists, and loads the catalog file that defines the
//! track universe. Payloads are JSON: a `Track` object for the tracks
//! namespace, a plain integer array for every recommendation namespace.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One catalog track. The `track` field is the integer id used as the
/// key everywhere else in the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub track: i64,
    pub artist: String,
    pub title: String,
}

/// Decode a stored payload into an ordered recommendation list.
///
/// Ordering is relevance-descending; callers that sample a top-K window
/// rely on it.
pub fn decode_list(bytes: &[u8]) -> Result<Vec<i64>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a recommendation list for storage.
pub fn encode_list(tracks: &[i64]) -> Vec<u8> {
    // Vec<i64> to JSON cannot fail
    serde_json::to_vec(tracks).unwrap_or_default()
}

/// Decode a stored payload into a track metadata record.
pub fn decode_track(bytes: &[u8]) -> Result<Track> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a track metadata record for storage.
pub fn encode_track(track: &Track) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(track)?)
}

/// The loaded track catalog: the full track universe.
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Load the catalog from a JSON-lines file, one `Track` per line.
    /// Blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Config(format!("Cannot open catalog file {}: {}", path.display(), e))
        })?;

        let mut tracks = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let track: Track = serde_json::from_str(&line).map_err(|e| {
                Error::Config(format!(
                    "Bad catalog record at {}:{}: {}",
                    path.display(),
                    lineno + 1,
                    e
                ))
            })?;
            tracks.push(track);
        }

        Ok(Self { tracks })
    }

    /// Build a catalog from already-parsed tracks. Used by tests.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// All track ids, in catalog order.
    pub fn track_ids(&self) -> Vec<i64> {
        self.tracks.iter().map(|t| t.track).collect()
    }
}
