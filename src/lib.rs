//! Dutch Blitz score keeper, in-browser WASM.
//!
//! Exports `handle_request(method, path, query, body)` for the Service Worker
//! bridge to call. Uses `matchit` for URL routing — the same router
//! engine that powers Axum. Responses are HTML fragments for HTMX to swap
//! into `#board`; mutating routes append a script that saves the session to
//! localStorage.
//!
//! Besides the router, the module exports `normalize_avatar` for uploaded
//! photos, `configure` for host overrides, and the `EmberOverlay` class
//! driving the in-play particle canvas. Log records go to the browser
//! console through `console_log`, installed when the module starts.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod game;
pub mod routes;

pub use game::overlay::EmberOverlay;

/// Runs once when the worker instantiates the module.
#[wasm_bindgen(start)]
pub fn start() {
    // Fails only if a logger is already installed.
    if console_log::init_with_level(log::Level::Trace).is_ok() {
        apply_log_level(&game::state::with_config(config::Config::clone));
    }
}

fn apply_log_level(config: &config::Config) {
    if let Ok(filter) = config.log_filter() {
        log::set_max_level(filter);
    }
}

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method` — HTTP method (e.g., "GET", "POST")
/// * `path`   — URL path (e.g., "/api/board")
/// * `query`  — Query string (e.g., "?player=abc&sign=plus")
/// * `body`   — Request body (e.g., POST form data). Empty string for GET requests.
///
/// # Returns
/// An HTML string fragment suitable for HTMX to swap into the DOM.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    // Register routes — the value is a &str tag we match on below
    router.insert("/api/board", "board").ok();
    router.insert("/api/leaderboard", "leaderboard").ok();
    router.insert("/api/roster", "roster").ok();
    router.insert("/api/roster/avatar", "roster_avatar").ok();
    router.insert("/api/game", "game").ok();
    router.insert("/api/score", "score").ok();
    router.insert("/api/state", "state").ok();
    router.insert("/api/state/restore", "state_restore").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            // GET routes
            ("board", "GET") => routes::board::handle_board_get(query),
            ("leaderboard", "GET") => routes::board::handle_leaderboard_get(query),
            ("score", "GET") => routes::score::handle_score_get(query),
            ("state", "GET") => routes::state::handle_state_get(query),

            // POST routes
            ("roster", "POST") => routes::roster::handle_roster_post(body),
            ("roster_avatar", "POST") => routes::roster::handle_avatar_post(body),
            ("game", "POST") => routes::game::handle_game_post(body),
            ("score", "POST") => routes::score::handle_score_post(body),
            ("state_restore", "POST") => routes::state::handle_restore_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

/// Shrink an uploaded photo into a JPEG data URL for a new player.
///
/// Returns an empty string if the bytes are not a decodable image; the page
/// keeps the previous avatar in that case.
#[wasm_bindgen]
pub fn normalize_avatar(bytes: &[u8]) -> String {
    let (max_side, quality) =
        game::state::with_config(|c| (c.avatar_max_side, c.avatar_quality));
    match game::avatar::normalize(bytes, max_side, quality) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("avatar rejected: {}", e);
            String::new()
        }
    }
}

/// Override configuration from a JSON object. Returns "ok" or "error: …".
#[wasm_bindgen]
pub fn configure(json: &str) -> String {
    match config::Config::from_json(json) {
        Ok(config) => {
            apply_log_level(&config);
            game::state::replace_config(config);
            "ok".to_string()
        }
        Err(e) => format!("error: {}", e),
    }
}

fn not_found() -> String {
    r#"<span class="text-rose-600">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-rose-600">405 — method not allowed</span>"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state;

    fn reset_state() {
        state::reset();
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let html = handle_request("GET", "/api/nonexistent", "", "");
        assert!(html.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let html = handle_request("POST", "/api/board", "", "");
        assert!(html.contains("405"));
        let html = handle_request("GET", "/api/state/restore", "", "");
        assert!(html.contains("405"));
    }

    #[test]
    fn routes_board_get() {
        reset_state();
        let html = handle_request("GET", "/api/board", "", "");
        assert!(html.contains("Target Points"));
        reset_state();
    }

    #[test]
    fn full_match_through_router() {
        reset_state();
        handle_request("POST", "/api/roster", "", "action=add&name=Ada");
        handle_request("POST", "/api/roster", "", "action=add&name=Bram");
        handle_request("POST", "/api/roster", "", "action=target&value=100");
        let html = handle_request("POST", "/api/game", "", "action=start");
        assert!(html.contains("Finish"));

        let bram = state::with_session(|s| s.players[1].id.to_string());
        let modal = handle_request("GET", "/api/score", &format!("?player={}&sign=plus", bram), "");
        assert!(modal.contains("Bram"));

        let html = handle_request(
            "POST",
            "/api/score",
            "",
            &format!("action=apply&player={}&points=100&sign=plus", bram),
        );
        assert!(html.contains("Bram Blitzed!"));

        let board = handle_request("GET", "/api/leaderboard", "", "");
        assert!(board.contains("width: 100.0%"));
        reset_state();
    }

    #[test]
    fn routes_state_roundtrip() {
        reset_state();
        handle_request("POST", "/api/roster", "", "action=add&name=Ada");
        let json = handle_request("GET", "/api/state", "", "");
        assert!(json.contains(r#""target":"75""#));
        assert!(json.contains("Ada"));
        state::reset();
        assert_eq!(handle_request("POST", "/api/state/restore", "", &json), "ok");
        state::with_session(|s| assert_eq!(s.players[0].name, "Ada"));
        reset_state();
    }

    #[test]
    fn routes_avatar_post() {
        reset_state();
        let html = handle_request("POST", "/api/roster/avatar", "", "image=data:image/jpeg;base64,AA");
        assert!(html.contains("data:image/jpeg;base64,AA"));
        reset_state();
    }

    #[test]
    fn normalize_avatar_returns_empty_on_garbage() {
        reset_state();
        assert!(normalize_avatar(b"definitely not a png").is_empty());
        reset_state();
    }

    #[test]
    fn configure_overrides_defaults() {
        reset_state();
        assert_eq!(configure(r#"{"default_target": 100, "ember_count": 40}"#), "ok");
        state::with_config(|c| {
            assert_eq!(c.default_target, 100);
            assert_eq!(c.ember_count, 40);
        });
        assert!(configure(r#"{"default_target": -1}"#).starts_with("error:"));

        assert_eq!(configure(r#"{"log_level": "warn"}"#), "ok");
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
        assert!(configure(r#"{"log_level": "chatty"}"#).starts_with("error:"));
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
        assert_eq!(configure("{}"), "ok");
        assert_eq!(log::max_level(), log::LevelFilter::Info);
        reset_state();
    }
}
