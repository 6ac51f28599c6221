//! Player records as stored in the roster and persisted to localStorage.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::routes::util::percent_encode;

/// Opaque player identifier. New players get a UUID v4; ids restored from
/// storage are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Data URL from the avatar normalizer, or the generated fallback URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub score: i64,
    /// One signed entry per applied round score. `score` is always its sum.
    #[serde(default)]
    pub history: Vec<i64>,
}

impl Player {
    /// Build a fresh player. Returns `None` when the name is blank.
    ///
    /// Without an uploaded image the player gets a generated avatar seeded by
    /// the trimmed name, so the same name always yields the same picture.
    pub fn new(name: &str, image: Option<String>, fallback_base: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let image = match image {
            Some(img) if !img.is_empty() => img,
            _ => fallback_avatar(fallback_base, name),
        };
        Some(Self {
            id: PlayerId::new(),
            name: name.to_string(),
            image,
            score: 0,
            history: Vec::new(),
        })
    }

    /// Record a signed round score.
    pub fn push_round(&mut self, delta: i64) {
        self.score += delta;
        self.history.push(delta);
    }

    /// Drop the most recent round score. Returns the removed entry.
    pub fn pop_round(&mut self) -> Option<i64> {
        let last = self.history.pop()?;
        self.score -= last;
        Some(last)
    }

    pub fn reset_scores(&mut self) {
        self.score = 0;
        self.history.clear();
    }

    /// Sum of the recorded rounds, or `None` if it does not fit in an `i64`.
    pub fn history_total(&self) -> Option<i64> {
        self.history.iter().try_fold(0i64, |acc, &x| acc.checked_add(x))
    }
}

/// Deterministic generated-avatar URL for a player name.
pub fn fallback_avatar(base: &str, name: &str) -> String {
    format!("{}{}", base, percent_encode(name))
}
