//! `/api/state/*` routes — localStorage persistence bridge.
//!
//! The worker cannot touch `localStorage`, so writes travel back to the main
//! thread inside the HTML fragment: every mutating route appends a small
//! `<script>` (see [`persist_script`]) that HTMX runs after the swap. On page
//! load the main thread reads the three entries and posts them to
//! `/api/state/restore`.

use crate::game::state;
use crate::game::storage::{KeyValueStore, StorageError, StoredEntries};
use crate::routes::util::js_string;

/// Store that turns writes into `localStorage.setItem` calls for the main
/// thread. It has nothing to read.
#[derive(Debug, Default)]
pub struct ScriptStore {
    writes: Vec<(String, String)>,
}

impl KeyValueStore for ScriptStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

impl ScriptStore {
    /// Render the queued writes. Storage errors (quota, private mode) are
    /// caught in the page and only logged.
    pub fn into_script(self) -> String {
        if self.writes.is_empty() {
            return String::new();
        }
        let mut js = String::with_capacity(256);
        js.push_str("<script>\n(function() {\n  try {\n");
        for (key, value) in &self.writes {
            js.push_str(&format!(
                "    localStorage.setItem({}, {});\n",
                js_string(key),
                js_string(value)
            ));
        }
        js.push_str(
            "  } catch (e) {\n    console.error('[blitz] Failed to save to storage', e);\n  }\n})();\n</script>",
        );
        js
    }
}

/// Script that writes the current session to localStorage.
pub fn persist_script() -> String {
    let mut store = ScriptStore::default();
    state::persist_to(&mut store);
    store.into_script()
}

/// Append the persistence script to a fragment when the action changed
/// something.
pub fn with_persist(html: String, changed: bool) -> String {
    if !changed {
        return html;
    }
    let mut html = html;
    html.push_str(&persist_script());
    html
}

// ── GET /api/state ─────────────────────────────────────────────────

/// Handle GET /api/state
/// Returns the three storage entries as a JSON object of strings.
pub fn handle_state_get(_query: &str) -> String {
    match state::export_entries() {
        Ok(entries) => serde_json::to_string(&entries).unwrap_or_else(|_| "{}".to_string()),
        Err(e) => {
            log::error!("failed to export session: {}", e);
            "{}".to_string()
        }
    }
}

// ── POST /api/state/restore ────────────────────────────────────────

/// Handle POST /api/state/restore
/// Body: `{"players": <raw string|null>, "target": <raw string|null>, "playing": <raw string|null>}`
/// exactly as read from localStorage. Malformed entries fall back to
/// defaults; a malformed body leaves the session untouched.
pub fn handle_restore_post(body: &str) -> String {
    if body.trim().is_empty() {
        return "ok".to_string();
    }
    match serde_json::from_str::<StoredEntries>(body) {
        Ok(entries) => {
            state::restore_entries(&entries);
            "ok".to_string()
        }
        Err(e) => {
            log::warn!("failed to load from storage: {}", e);
            format!("error: {}", e)
        }
    }
}
