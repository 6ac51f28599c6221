//! `/api/game` routes — match lifecycle: start (or rematch), finish, back to roster.

use crate::game::leaderboard::Leaderboard;
use crate::game::session::Action;
use crate::game::state;
use crate::routes::board::render_board;
use crate::routes::state::with_persist;
use crate::routes::util::{get_param, parse_form_body};

// ── POST /api/game ─────────────────────────────────────────────────

/// Handle POST /api/game
/// Body params:
///   - action=start  → zero all scores and enter play (also "New Match")
///   - action=finish → end now, declaring the current leader the winner
///   - action=roster → back to setup, scores kept until the next start
///
/// Returns the re-rendered board.
pub fn handle_game_post(body: &str) -> String {
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");

    let changed = match action {
        "start" => state::dispatch(Action::StartGame),
        "finish" => {
            let leader = state::with_session(|s| {
                Leaderboard::new(s).leader().map(|p| p.id.clone())
            });
            match leader {
                Some(id) => state::dispatch(Action::EndGame(id)),
                None => false,
            }
        }
        "roster" => state::dispatch(Action::ReturnToRoster),
        _ => false,
    };

    with_persist(render_board(None), changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset_state() {
        state::reset();
    }

    fn seed(names: &[&str]) {
        for name in names {
            state::dispatch(Action::AddPlayer { name: name.to_string(), image: None });
        }
    }

    #[test]
    fn start_enters_play() {
        reset_state();
        seed(&["Ada"]);
        let html = handle_game_post("action=start");
        assert!(html.contains("Finish"));
        assert!(html.contains("localStorage.setItem(\"dutch_blitz_is_playing_v5\", \"true\")"));
        state::with_session(|s| assert!(s.is_playing));
        reset_state();
    }

    #[test]
    fn start_without_players_is_noop() {
        reset_state();
        let html = handle_game_post("action=start");
        assert!(html.contains("Start Game"));
        state::with_session(|s| assert!(!s.is_playing));
        reset_state();
    }

    #[test]
    fn finish_declares_leader() {
        reset_state();
        seed(&["Ada", "Bram"]);
        handle_game_post("action=start");
        let bram = state::with_session(|s| s.players[1].id.clone());
        state::dispatch(Action::ApplyRoundScore {
            player: bram,
            magnitude: "9".into(),
            positive: true,
        });
        let html = handle_game_post("action=finish");
        assert!(html.contains("Bram Blitzed!"));
        reset_state();
    }

    #[test]
    fn roster_keeps_scores_and_rematch_resets() {
        reset_state();
        seed(&["Ada"]);
        handle_game_post("action=start");
        let ada = state::with_session(|s| s.players[0].id.clone());
        state::dispatch(Action::ApplyRoundScore {
            player: ada,
            magnitude: "80".into(),
            positive: true,
        });
        handle_game_post("action=roster");
        state::with_session(|s| {
            assert!(!s.is_playing);
            assert!(s.winner.is_none());
            assert_eq!(s.players[0].score, 80);
        });
        handle_game_post("action=start");
        state::with_session(|s| {
            assert_eq!(s.players[0].score, 0);
            assert!(s.winner.is_none());
        });
        reset_state();
    }
}
