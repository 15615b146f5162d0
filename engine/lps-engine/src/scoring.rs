//! Gameweek score normalization
//!
//! Convention: the provider's `entry_history.points` is the score AFTER
//! transfer cost (net) and `entry_history.event_transfers_cost` is the cost
//! itself. Raw points are rebuilt as `net + minus`, so `net = raw - minus`
//! holds for every score this module produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Points for one entry in one gameweek
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekScore {
    /// Points before transfer cost
    pub raw_points: i64,

    /// Transfer cost, never negative
    pub minus_points: i64,

    /// Points after transfer cost
    pub net_points: i64,
}

impl GameweekScore {
    /// Build from points after transfer cost, `None` if raw points overflow
    pub fn from_net(net_points: i64, minus_points: i64) -> Option<Self> {
        let minus_points = minus_points.max(0);
        let raw_points = net_points.checked_add(minus_points)?;
        Some(Self { raw_points, minus_points, net_points })
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Normalize a provider payload, degrading anything unreadable to zeros
    pub fn from_payload(payload: &Value) -> (Self, ScoreSource) {
        match payload.get("entry_history").filter(|history| history.is_object()) {
            Some(history) => {
                let net = integer_field(history, "points");
                let minus = integer_field(history, "event_transfers_cost");
                match Self::from_net(net, minus) {
                    Some(score) => (score, ScoreSource::Provider),
                    None => (Self::zero(), ScoreSource::Fallback),
                }
            }
            None => (Self::zero(), ScoreSource::Fallback),
        }
    }

    /// Normalize a fetch result, failures become a zero score
    pub fn from_fetch(fetch: &ScoreFetch) -> (Self, ScoreSource) {
        match fetch {
            ScoreFetch::Fetched(payload) => Self::from_payload(payload),
            ScoreFetch::Failed { .. } => (Self::zero(), ScoreSource::Fallback),
        }
    }
}

/// Where a score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreSource {
    /// Read from a well-formed provider payload
    Provider,

    /// Fetch failed or payload was malformed, score zeroed
    Fallback,
}

/// Outcome of asking the provider for one entry's gameweek payload
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFetch {
    Fetched(Value),
    Failed { reason: String },
}

impl ScoreFetch {
    pub fn is_failed(&self) -> bool {
        matches!(self, ScoreFetch::Failed { .. })
    }
}

// Integers may arrive as numbers, floats or numeric strings
fn integer_field(object: &Value, key: &str) -> i64 {
    match object.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
