//! Global session owner.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The Web Worker keeps the WASM module alive, so the session lives
//! across `handle_request` calls for the whole page lifetime. Only
//! [`dispatch`] changes the session, and it does so through the pure
//! [`reduce`]; writing the result to localStorage is left to the caller.

use std::cell::RefCell;

use crate::config::Config;
use crate::game::session::{reduce, Action, Session};
use crate::game::storage::{KeyValueStore, StoredEntries};

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
    static CONFIG: RefCell<Config> = RefCell::new(Config::default());
    /// Normalized avatar waiting for the next "Add Player".
    static PENDING_AVATAR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Execute a closure with read access to the session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session) -> R,
{
    SESSION.with(|s| f(&s.borrow()))
}

/// Execute a closure with read access to the active config.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    CONFIG.with(|c| f(&c.borrow()))
}

pub fn replace_config(config: Config) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Replace the entire session (used by restore and tests).
pub fn replace_session(session: Session) {
    SESSION.with(|s| *s.borrow_mut() = session);
}

/// Run one transition against the owned session. Returns whether anything
/// changed, so callers can skip persisting no-ops.
pub fn dispatch(action: Action) -> bool {
    let config = with_config(Config::clone);
    SESSION.with(|cell| {
        let current = cell.borrow().clone();
        let next = reduce(current, &action, &config);
        let changed = *cell.borrow() != next;
        *cell.borrow_mut() = next;
        changed
    })
}

/// Current session in its stored form.
pub fn export_entries() -> Result<StoredEntries, crate::game::storage::StorageError> {
    with_session(StoredEntries::encode)
}

/// Rebuild the session from raw stored entries.
pub fn restore_entries(entries: &StoredEntries) {
    let session = with_config(|config| entries.decode(config));
    replace_session(session);
}

/// Write the owned session to `store`, logging any failure.
pub fn persist_to(store: &mut dyn KeyValueStore) {
    with_config(|config| {
        with_session(|session| crate::game::storage::persist(session, store, &config.storage))
    });
}

pub fn set_pending_avatar(image: Option<String>) {
    PENDING_AVATAR.with(|p| *p.borrow_mut() = image);
}

pub fn pending_avatar() -> Option<String> {
    PENDING_AVATAR.with(|p| p.borrow().clone())
}

/// Hand the pending avatar to a new player, clearing it.
pub fn take_pending_avatar() -> Option<String> {
    PENDING_AVATAR.with(|p| p.borrow_mut().take())
}

/// Reset everything to first-visit defaults.
pub fn reset() {
    replace_config(Config::default());
    replace_session(Session::default());
    set_pending_avatar(None);
}
