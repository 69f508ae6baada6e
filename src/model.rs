//! Typed rows for the catalog backend's JSON responses.
//!
//! One discriminated type per endpoint, instead of a single loosely-typed
//! record: the endpoints genuinely return different shapes and mixing them
//! up should fail at deserialization, not deep inside a pipeline.

use serde::de::{Deserialize, Deserializer};
use serde::Serialize;
use serde_json::Value;

/// Opaque stable identifier for a song, used as a path segment and cache key.
pub type SongId = String;

/// Render a loosely-typed JSON scalar as a display string. The backend is
/// not strict about string-vs-number for ids and attribute values.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Search results
// =============================================================================

/// One search result row: id plus four display-ready columns.
///
/// Wire form is a 5-element JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRow {
    pub id: SongId,
    pub columns: [String; 4],
}

impl<'de> Deserialize<'de> for SongRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: (Value, Value, Value, Value, Value) = Deserialize::deserialize(deserializer)?;
        Ok(SongRow {
            id: text_of(&raw.0),
            columns: [text_of(&raw.1), text_of(&raw.2), text_of(&raw.3), text_of(&raw.4)],
        })
    }
}

/// Per-song detail attributes: an ordered set of key/value pairs with a
/// small open key vocabulary. Wire form is an array of `[key, value]`
/// pairs. Immutable once stored in the session cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SongDetail {
    pub attrs: Vec<(String, String)>,
}

impl<'de> Deserialize<'de> for SongDetail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<(String, Value)> = Deserialize::deserialize(deserializer)?;
        Ok(SongDetail {
            attrs: raw.into_iter().map(|(k, v)| (k, text_of(&v))).collect(),
        })
    }
}

// =============================================================================
// Statistics rows
// =============================================================================

/// One per-season observation from `/stats/vintage`.
///
/// `guess_rate` is null for seasons where nothing was ever guessed.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct VintageStatRow {
    pub kind: String,
    pub vintage: String,
    pub guess_rate: Option<f64>,
    pub guess_count: u64,
    pub times_played: u64,
}

/// One equal-width difficulty bin from `/stats/difficulty/{bins}`.
/// `diff_bin` is 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct DifficultyBinRow {
    pub diff_bin: u32,
    pub guess_rate: Option<f64>,
    pub guess_count: u64,
    pub times_played: u64,
}

/// One explicit-bounds difficulty bucket from `/stats/difficulty2/{bins}`,
/// broken out per category. No play-count column in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct DifficultyBucketRow {
    pub kind: String,
    pub bucket_min: f64,
    pub bucket_max: f64,
    pub guess_rate: Option<f64>,
    pub guess_count: u64,
}
