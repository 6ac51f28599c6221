//! `/api/board` and `/api/leaderboard` — the main score board view.
//!
//! The board is one HTMX swap target (`#board`). Every roster, game and
//! score action re-renders it whole, so the page never shows a half-updated
//! state. The scoring modal is rendered inside the board when open.

use crate::game::leaderboard::Leaderboard;
use crate::game::player::Player;
use crate::game::session::Session;
use crate::game::state;
use crate::routes::util::{escape_html, percent_encode};

// ── GET /api/board ─────────────────────────────────────────────────

/// Handle GET /api/board
pub fn handle_board_get(_query: &str) -> String {
    render_board(None)
}

// ── GET /api/leaderboard ───────────────────────────────────────────

/// Handle GET /api/leaderboard
/// Returns only the leader/underdog cards (empty outside play).
pub fn handle_leaderboard_get(_query: &str) -> String {
    state::with_session(render_leaderboard)
}

// ── Board rendering ────────────────────────────────────────────────

/// Render the whole board. `modal` is pre-rendered scoring modal HTML to
/// show on top, if any.
pub fn render_board(modal: Option<String>) -> String {
    let pending = state::pending_avatar();
    let (presets, ember_count) =
        state::with_config(|c| (c.target_presets.clone(), c.ember_count));

    state::with_session(|session| {
        let mut html = String::with_capacity(8192);
        html.push_str(r#"<div class="max-w-2xl mx-auto">"#);
        html.push_str(&render_header(session));
        if !session.is_playing {
            html.push_str(&render_target_picker(session.target_score, &presets));
            html.push_str(&render_add_form(pending.as_deref()));
        }
        html.push_str(&render_leaderboard(session));
        html.push_str(&render_player_list(session));
        html.push_str(r#"<div id="score-modal">"#);
        if let Some(modal) = modal {
            html.push_str(&modal);
        }
        html.push_str(r#"</div>"#);
        if let Some(winner) = session.winner() {
            html.push_str(&render_winner_modal(winner));
        }
        if session.is_playing {
            html.push_str(&render_overlay(ember_count));
        }
        html.push_str(r#"</div>"#);
        html
    })
}

fn render_header(session: &Session) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(r#"<header class="flex justify-between items-center py-4">"#);
    html.push_str(r#"<div class="flex items-center gap-2">"#);
    if session.is_playing {
        html.push_str(
            r#"<span class="flex h-2 w-2 rounded-full bg-red-500 animate-pulse"></span>"#,
        );
    }
    html.push_str(r#"<span class="text-2xl font-black text-indigo-600">Dutch Blitz</span></div>"#);

    if session.is_playing {
        html.push_str(
            r#"<button class="flex items-center gap-2 px-4 py-2 bg-slate-200 text-slate-700 rounded-xl font-bold hover:bg-slate-300" onclick="htmx.ajax('POST', '/api/game', {values: {action: 'finish'}, target: '#board', swap: 'innerHTML'})">Finish</button>"#,
        );
    } else {
        let disabled = if session.players.is_empty() { " disabled" } else { "" };
        html.push_str(&format!(
            r#"<button class="flex items-center gap-2 px-6 py-3 bg-indigo-600 text-white rounded-xl font-bold hover:bg-indigo-700 shadow-lg disabled:opacity-50"{} onclick="htmx.ajax('POST', '/api/game', {{values: {{action: 'start'}}, target: '#board', swap: 'innerHTML'}})">Start Game</button>"#,
            disabled
        ));
    }
    html.push_str(r#"</header>"#);
    html
}

fn render_target_picker(target: i64, presets: &[i64]) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div class="bg-white border border-slate-200 rounded-2xl p-6 shadow-sm mb-4">"#);
    html.push_str(
        r#"<label class="block text-sm font-bold text-slate-500 uppercase tracking-wider mb-3" for="targetScore">Target Points</label>"#,
    );
    html.push_str(r#"<div class="flex gap-2">"#);
    for &preset in presets {
        let class = if preset == target {
            "bg-indigo-50 border-indigo-600 text-indigo-600"
        } else {
            "bg-transparent border-slate-100 text-slate-400"
        };
        html.push_str(&format!(
            r#"<button class="flex-1 py-3 rounded-xl font-bold border-2 transition-all {}" onclick="htmx.ajax('POST', '/api/roster', {{values: {{action: 'target', value: '{}'}}, target: '#board', swap: 'innerHTML'}})">{}</button>"#,
            class, preset, preset
        ));
    }
    html.push_str(&format!(
        r#"<input type="number" inputmode="numeric" id="targetScore" min="1" value="{}" placeholder="Custom" class="w-24 text-center bg-slate-100 rounded-xl font-bold outline-none focus:ring-2 focus:ring-indigo-500" onchange="htmx.ajax('POST', '/api/roster', {{values: {{action: 'target', value: this.value}}, target: '#board', swap: 'innerHTML'}})">"#,
        target
    ));
    html.push_str(r#"</div></div>"#);
    html
}

fn render_add_form(pending: Option<&str>) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(
        r#"<div class="bg-white rounded-2xl p-4 border border-slate-200 shadow-sm flex flex-col gap-4 mb-6">"#,
    );
    html.push_str(r#"<div class="flex items-center gap-4">"#);
    html.push_str(&render_avatar_picker(pending));
    html.push_str(
        r#"<input type="text" id="newPlayerName" placeholder="Member Name..." class="flex-1 text-xl font-bold bg-transparent border-none outline-none" onkeydown="if (event.key === 'Enter') document.getElementById('addPlayerBtn').click()">"#,
    );
    html.push_str(r#"</div>"#);
    html.push_str(
        r#"<button id="addPlayerBtn" class="w-full bg-slate-900 text-white py-3 rounded-xl font-bold" onclick="htmx.ajax('POST', '/api/roster', {values: {action: 'add', name: document.getElementById('newPlayerName').value}, target: '#board', swap: 'innerHTML'})">Add Player</button>"#,
    );
    html.push_str(r#"</div>"#);
    html
}

/// Avatar slot of the add-player form. Clicking it opens the file picker;
/// the page hands the file bytes to `normalize_avatar` and posts the result
/// to `/api/roster/avatar`.
pub fn render_avatar_picker(pending: Option<&str>) -> String {
    let mut html = String::with_capacity(512);
    html.push_str(
        r#"<div id="avatar-picker" class="w-16 h-16 rounded-2xl bg-slate-100 flex items-center justify-center overflow-hidden shrink-0 border-2 border-dashed border-slate-300 cursor-pointer" onclick="document.getElementById('avatarInput').click()">"#,
    );
    match pending {
        Some(src) => html.push_str(&format!(
            r#"<img src="{}" class="w-full h-full object-cover" alt="">"#,
            escape_html(src)
        )),
        None => html.push_str(r#"<span class="text-slate-400 text-2xl">&#x1F4F7;</span>"#),
    }
    html.push_str(
        r#"<input type="file" id="avatarInput" accept="image/*" class="hidden" onchange="blitz.uploadAvatar(this.files[0])">"#,
    );
    html.push_str(r#"</div>"#);
    html
}

/// Leader and underdog cards. Hidden outside play and until the leader has
/// scored.
pub fn render_leaderboard(session: &Session) -> String {
    let board = Leaderboard::new(session);
    let Some(leader) = board.leader() else {
        return String::new();
    };
    if !session.is_playing || leader.score == 0 {
        return String::new();
    }

    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div id="leaderboard" class="grid grid-cols-1 md:grid-cols-2 gap-4 mb-8">"#);

    html.push_str(r#"<div class="bg-indigo-600 rounded-2xl p-4 text-white shadow-xl">"#);
    html.push_str(
        r#"<div class="flex items-center justify-between mb-3"><span class="text-[10px] font-black uppercase tracking-widest opacity-70">Almost Blitzed</span><span>&#x1F3C6;</span></div>"#,
    );
    html.push_str(r#"<div class="flex items-center gap-3">"#);
    html.push_str(&format!(
        r#"<img src="{}" class="w-12 h-12 rounded-xl object-cover border-2 border-white/20" alt="">"#,
        escape_html(&leader.image)
    ));
    html.push_str(&format!(
        r#"<div class="flex-1 min-w-0"><h3 class="font-bold text-sm truncate">{}</h3>"#,
        escape_html(&leader.name)
    ));
    html.push_str(&format!(
        r#"<div class="h-2 bg-indigo-900/40 rounded-full mt-2 overflow-hidden"><div class="h-full bg-yellow-400 transition-all duration-700" style="width: {:.1}%"></div></div>"#,
        board.leader_progress()
    ));
    html.push_str(r#"</div></div></div>"#);

    if let (Some(underdog), Some(message)) = (board.underdog(), board.underdog_message()) {
        html.push_str(
            r#"<div class="bg-white border-2 border-dashed border-slate-200 rounded-2xl p-4">"#,
        );
        html.push_str(
            r#"<div class="flex items-center justify-between mb-3"><span class="text-[10px] font-black text-slate-400 uppercase tracking-widest">The Underdog</span><span>&#x2728;</span></div>"#,
        );
        html.push_str(r#"<div class="flex items-center gap-3">"#);
        html.push_str(&format!(
            r#"<img src="{}" class="w-12 h-12 rounded-xl object-cover grayscale opacity-70" alt="">"#,
            escape_html(&underdog.image)
        ));
        html.push_str(&format!(
            r#"<div class="flex-1 min-w-0"><h3 class="font-bold text-sm text-slate-800 truncate">{}</h3>"#,
            escape_html(&underdog.name)
        ));
        html.push_str(&format!(
            r#"<p class="text-[10px] font-bold text-indigo-500 uppercase mt-1">{}</p>"#,
            escape_html(message)
        ));
        html.push_str(r#"</div></div></div>"#);
    }

    html.push_str(r#"</div>"#);
    html
}

fn render_player_list(session: &Session) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(r#"<div class="space-y-3">"#);
    for (index, player) in session.players.iter().enumerate() {
        html.push_str(&render_player_row(player, index, session.is_playing));
    }
    html.push_str(r#"</div>"#);
    html
}

fn render_player_row(player: &Player, index: usize, playing: bool) -> String {
    let mut html = String::with_capacity(1536);
    html.push_str(
        r#"<div class="player-row bg-white rounded-2xl border border-slate-200 shadow-sm flex items-stretch">"#,
    );

    // Reorder controls only in setup
    if !playing {
        html.push_str(
            r#"<div class="flex flex-col bg-slate-50 border-r px-1 py-2 justify-center gap-1">"#,
        );
        for (direction, glyph) in [("up", "&#x25B2;"), ("down", "&#x25BC;")] {
            html.push_str(&format!(
                r#"<button class="p-1 text-slate-400" aria-label="Move {dir}" onclick="htmx.ajax('POST', '/api/roster', {{values: {{action: 'move', index: '{idx}', direction: '{dir}'}}, target: '#board', swap: 'innerHTML'}})">{glyph}</button>"#,
                dir = direction,
                idx = index,
                glyph = glyph
            ));
        }
        html.push_str(r#"</div>"#);
    }

    html.push_str(r#"<div class="flex-1 p-4 flex items-center gap-4">"#);
    html.push_str(&format!(
        r#"<img src="{}" alt="" class="w-16 h-16 rounded-2xl object-cover border bg-slate-50 shrink-0">"#,
        escape_html(&player.image)
    ));
    html.push_str(r#"<div class="flex-1 min-w-0"><div class="flex justify-between items-start">"#);
    html.push_str(&format!(
        r#"<h4 class="font-bold text-slate-800 text-lg truncate">{}</h4>"#,
        escape_html(&player.name)
    ));
    if !playing {
        html.push_str(&format!(
            r#"<button class="text-slate-300 hover:text-red-500" aria-label="Remove player" onclick="htmx.ajax('POST', '/api/roster', {{values: {{action: 'remove', id: decodeURIComponent('{}')}}, target: '#board', swap: 'innerHTML'}})">&#x2715;</button>"#,
            id_param(player.id.as_str())
        ));
    }
    html.push_str(r#"</div>"#);

    if playing {
        html.push_str(&format!(
            r#"<div class="mt-1"><p class="text-3xl font-black text-slate-900 leading-none">{}</p>"#,
            player.score
        ));
        html.push_str(&render_history(&player.history));
        html.push_str(r#"</div>"#);
    }
    html.push_str(r#"</div>"#);

    if playing {
        html.push_str(r#"<div class="flex gap-[5px]">"#);
        for (sign, class, glyph) in [
            ("minus", "bg-red-100 text-red-600", "&#x2212;"),
            ("plus", "bg-green-100 text-green-600", "+"),
        ] {
            html.push_str(&format!(
                r#"<button class="h-12 w-12 flex items-center justify-center {} rounded-xl font-black active:scale-90 transition-all shrink-0" onclick="htmx.ajax('GET', '/api/score?player={}&sign={}', {{target: '#score-modal', swap: 'innerHTML'}})">{}</button>"#,
                class,
                id_param(player.id.as_str()),
                sign,
                glyph
            ));
        }
        html.push_str(r#"</div>"#);
    }

    html.push_str(r#"</div></div>"#);
    html
}

/// Player id made safe for a single-quoted JS string inside an attribute.
/// Also valid as a query parameter value.
pub fn id_param(id: &str) -> String {
    percent_encode(id).replace('\'', "%27")
}

/// Round-by-round chips under a player's total.
fn render_history(history: &[i64]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let mut html = String::with_capacity(64 * history.len());
    html.push_str(r#"<div class="mt-2 flex gap-1 overflow-x-auto">"#);
    for &points in history {
        let (class, label) = if points >= 0 {
            ("bg-emerald-50 text-emerald-700 border-emerald-100", format!("+{}", points))
        } else {
            ("bg-rose-50 text-rose-700 border-rose-100", points.to_string())
        };
        html.push_str(&format!(
            r#"<span class="history-chip text-[10px] font-black px-2 py-0.5 rounded-full shrink-0 border {}">{}</span>"#,
            class, label
        ));
    }
    html.push_str(r#"</div>"#);
    html
}

fn render_winner_modal(winner: &Player) -> String {
    let mut html = String::with_capacity(1536);
    html.push_str(
        r#"<div id="winner-modal" class="fixed inset-0 bg-slate-900/80 backdrop-blur-md flex items-center justify-center p-4 z-[70]">"#,
    );
    html.push_str(
        r#"<div class="bg-white rounded-[2.5rem] p-10 max-w-sm w-full text-center shadow-2xl">"#,
    );
    html.push_str(r#"<h2 class="text-3xl font-black text-slate-900 mb-2 uppercase">Match Over!</h2>"#);
    html.push_str(&format!(
        r#"<img src="{}" alt="" class="w-24 h-24 rounded-full mx-auto object-cover border-4 border-slate-50 mb-4">"#,
        escape_html(&winner.image)
    ));
    html.push_str(&format!(
        r#"<p class="text-xl font-bold text-indigo-600 mb-8 uppercase">{} Blitzed!</p>"#,
        escape_html(&winner.name)
    ));
    html.push_str(r#"<div class="space-y-3">"#);
    html.push_str(
        r#"<button class="w-full bg-indigo-600 text-white py-4 rounded-2xl font-bold text-xl shadow-lg" onclick="htmx.ajax('POST', '/api/game', {values: {action: 'start'}, target: '#board', swap: 'innerHTML'})">New Match</button>"#,
    );
    html.push_str(
        r#"<button class="w-full bg-slate-100 text-slate-500 py-3 rounded-2xl font-bold" onclick="htmx.ajax('POST', '/api/game', {values: {action: 'roster'}, target: '#board', swap: 'innerHTML'})">Roster</button>"#,
    );
    html.push_str(r#"</div></div></div>"#);
    html
}

/// Canvas for the ember overlay. Its presence is the on/off signal: the
/// page starts the animation when it appears and stops it when it is gone.
fn render_overlay(ember_count: usize) -> String {
    format!(
        r#"<div class="fixed inset-0 w-full h-full pointer-events-none overflow-hidden z-50"><canvas id="ember-overlay" data-embers="{}" style="display: block"></canvas></div>"#,
        ember_count
    )
}
