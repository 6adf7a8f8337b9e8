//! Opaque page keys.
//!
//! A key is the JSON form of [`PageCursor`] in unpadded URL-safe base64,
//! so it can travel in query strings untouched.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use nr_core::StoryReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// Resume point of a keyset query: the `(timestamp, id)` of the boundary
/// row and which way to continue from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub direction: Direction,
}

impl PageCursor {
    pub fn at(story: &StoryReference, direction: Direction) -> Self {
        Self {
            id: story.id.clone(),
            timestamp: story.timestamp,
            direction,
        }
    }

    pub fn encode(&self) -> String {
        // serializing plain strings and a timestamp cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// `None` for anything that is not a key produced by [`encode`](Self::encode).
    pub fn decode(key: &str) -> Option<Self> {
        let bytes = match URL_SAFE_NO_PAD.decode(key.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "Ignoring page key that is not base64");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(cursor) => Some(cursor),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed page key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cursor(direction: Direction) -> PageCursor {
        PageCursor {
            id: "3301234".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap() + chrono::Duration::nanoseconds(789),
            direction,
        }
    }

    #[test]
    fn test_round_trip_keeps_nanoseconds() {
        for direction in [Direction::Prev, Direction::Next] {
            let key = cursor(direction).encode();
            assert_eq!(PageCursor::decode(&key), Some(cursor(direction)));
        }
    }

    #[test]
    fn test_key_is_url_safe() {
        let key = cursor(Direction::Next).encode();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(cursor(Direction::Prev)).unwrap();
        assert_eq!(json["type"], "prev");
        assert_eq!(json["id"], "3301234");
    }

    #[test]
    fn test_garbage_is_no_cursor() {
        assert_eq!(PageCursor::decode("%%%"), None);
        assert_eq!(PageCursor::decode(&URL_SAFE_NO_PAD.encode(b"{\"id\":1}")), None);
        assert_eq!(PageCursor::decode(""), None);
    }
}
