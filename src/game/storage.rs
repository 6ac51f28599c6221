//! Persistence contract for the session.
//!
//! The session is stored as three independent key/value entries:
//!
//! ```text
//! dutch_blitz_players_v5     JSON array of player records
//! dutch_blitz_target_v5      decimal string, e.g. "75"
//! dutch_blitz_is_playing_v5  JSON boolean
//! ```
//!
//! Loading is defensive: each entry is parsed on its own and anything
//! missing or malformed falls back to its default with a warning. Saving
//! failures are reported to the caller, which logs and moves on; the
//! in-memory session stays authoritative either way.

use serde::{Deserialize, Serialize};
#[cfg(test)]
use std::collections::HashMap;
use thiserror::Error;

use crate::config::{Config, StorageKeys};
use crate::game::player::Player;
use crate::game::session::Session;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("quota exceeded while writing {key}")]
    QuotaExceeded { key: String },
    #[error("could not encode players: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal string key/value store, shaped after `window.localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests. The worker never reads storage itself: the
/// page posts the raw entries to `/api/state/restore`. With a quota set, writes that would push the total
/// stored bytes past it fail with [`StorageError::QuotaExceeded`].
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded { key: key.to_string() });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Raw text of the three entries, as read from or written to storage.
/// `None` means the key is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntries {
    #[serde(default)]
    pub players: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub playing: Option<String>,
}

impl StoredEntries {
    pub fn encode(session: &Session) -> Result<Self, StorageError> {
        Ok(Self {
            players: Some(serde_json::to_string(&session.players)?),
            target: Some(session.target_score.to_string()),
            playing: Some(session.is_playing.to_string()),
        })
    }

    /// Rebuild a session. Never fails; see the module docs for the fallbacks.
    pub fn decode(&self, config: &Config) -> Session {
        let mut session = Session::new(config.default_target);
        session.players = self.players.as_deref().map(decode_players).unwrap_or_default();
        if let Some(target) = self.target.as_deref().and_then(decode_target) {
            session.target_score = target;
        } else if self.target.is_some() {
            log::warn!(
                "stored target {:?} unusable, using {}",
                self.target,
                config.default_target
            );
        }
        session.is_playing = self.playing.as_deref().map(decode_playing).unwrap_or(false);
        // The winner is not stored; re-derive it from the restored scores.
        session.settle_winner();
        session
    }

    #[cfg(test)]
    fn read(store: &dyn KeyValueStore, keys: &StorageKeys) -> Self {
        Self {
            players: read_key(store, &keys.players),
            target: read_key(store, &keys.target),
            playing: read_key(store, &keys.playing),
        }
    }

    fn write(&self, store: &mut dyn KeyValueStore, keys: &StorageKeys) -> Result<(), StorageError> {
        for (key, value) in [
            (&keys.players, &self.players),
            (&keys.target, &self.target),
            (&keys.playing, &self.playing),
        ] {
            if let Some(value) = value {
                store.set(key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("failed to read {}: {}", key, e);
            None
        }
    }
}

fn decode_players(json: &str) -> Vec<Player> {
    let mut players: Vec<Player> = match serde_json::from_str(json) {
        Ok(players) => players,
        Err(e) => {
            log::warn!("stored players unreadable, starting with an empty roster: {}", e);
            return Vec::new();
        }
    };
    for p in &mut players {
        match p.history_total() {
            Some(total) if total != p.score => {
                log::warn!(
                    "player {} stored score {} disagrees with history total {}, using history",
                    p.id,
                    p.score,
                    total
                );
                p.score = total;
            }
            Some(_) => {}
            None => {
                log::warn!("player {} history overflows, clearing scores", p.id);
                p.reset_scores();
            }
        }
    }
    players
}

fn decode_target(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok().filter(|t| *t > 0)
}

fn decode_playing(text: &str) -> bool {
    serde_json::from_str::<bool>(text).unwrap_or_else(|e| {
        log::warn!("stored play flag {:?} unreadable: {}", text, e);
        false
    })
}

/// Write the session to `store`.
pub fn save(
    session: &Session,
    store: &mut dyn KeyValueStore,
    keys: &StorageKeys,
) -> Result<(), StorageError> {
    StoredEntries::encode(session)?.write(store, keys)
}

/// Save and swallow the outcome. Failures are logged and the caller carries on.
pub fn persist(session: &Session, store: &mut dyn KeyValueStore, keys: &StorageKeys) {
    if let Err(e) = save(session, store, keys) {
        log::error!("failed to persist session: {}", e);
    }
}

/// Read the session back from `store`.
#[cfg(test)]
pub fn load(store: &dyn KeyValueStore, config: &Config) -> Session {
    StoredEntries::read(store, &config.storage).decode(config)
}
