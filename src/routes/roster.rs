//! `/api/roster` routes — setup-screen roster editing and target choice.
//!
//! The transitions themselves do not check the mode; gating adds and
//! removals to setup happens here, the same way the page hides those
//! controls during play.

use crate::game::player::PlayerId;
use crate::game::session::{Action, Direction};
use crate::game::state;
use crate::routes::board::{render_avatar_picker, render_board};
use crate::routes::state::with_persist;
use crate::routes::util::{get_param, parse_form_body};

// ── POST /api/roster ───────────────────────────────────────────────

/// Handle POST /api/roster
/// Body params:
///   - action=add&name={name}                       → add a player (uses the pending avatar)
///   - action=remove&id={id}                        → remove a player
///   - action=move&index={n}&direction={up|down}    → swap with a neighbour
///   - action=target&value={n}                      → set the target score
///
/// Returns the re-rendered board.
pub fn handle_roster_post(body: &str) -> String {
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");
    let playing = state::with_session(|s| s.is_playing);

    let changed = match action {
        "add" if !playing => {
            let name = get_param(&params, "name").unwrap_or("");
            if name.trim().is_empty() {
                false
            } else {
                let image = state::take_pending_avatar();
                state::dispatch(Action::AddPlayer { name: name.to_string(), image })
            }
        }
        "remove" if !playing => match get_param(&params, "id") {
            Some(id) if !id.is_empty() => state::dispatch(Action::RemovePlayer(PlayerId::from(id))),
            _ => false,
        },
        "move" => {
            let index = get_param(&params, "index").and_then(|s| s.parse::<usize>().ok());
            let direction = get_param(&params, "direction").and_then(Direction::parse);
            match (index, direction) {
                (Some(index), Some(direction)) => {
                    state::dispatch(Action::MovePlayer { index, direction })
                }
                _ => false,
            }
        }
        "target" => match get_param(&params, "value").and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(value) => state::dispatch(Action::SetTarget(value)),
            None => false,
        },
        _ => false,
    };

    with_persist(render_board(None), changed)
}

// ── POST /api/roster/avatar ────────────────────────────────────────

/// Handle POST /api/roster/avatar
/// Body: image={data url}. An empty value clears the pending avatar.
/// Returns the refreshed avatar picker.
pub fn handle_avatar_post(body: &str) -> String {
    let params = parse_form_body(body);
    let image = get_param(&params, "image").unwrap_or("").trim();
    if image.is_empty() {
        state::set_pending_avatar(None);
    } else if image.starts_with("data:image/") {
        state::set_pending_avatar(Some(image.to_string()));
    } else {
        log::warn!("ignoring avatar that is not an image data URL");
    }
    render_avatar_picker(state::pending_avatar().as_deref())
}
