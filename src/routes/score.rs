//! `/api/score` routes — the round-score modal, apply and undo.

use crate::game::player::{Player, PlayerId};
use crate::game::session::{parse_round_points, Action};
use crate::game::state;
use crate::routes::board::{id_param, render_board};
use crate::routes::state::with_persist;
use crate::routes::util::{escape_html, get_param, parse_form_body, parse_query};

// ── GET /api/score ─────────────────────────────────────────────────

/// Handle GET /api/score?player={id}&sign={plus|minus}
/// Returns the scoring modal for one player, or nothing outside a match.
pub fn handle_score_get(query: &str) -> String {
    if !state::with_session(|s| s.is_playing) {
        return String::new();
    }
    let params = parse_query(query);
    let id = match get_param(&params, "player") {
        Some(s) if !s.is_empty() => PlayerId::from(s),
        _ => return r#"<span class="text-rose-600">Missing player parameter</span>"#.to_string(),
    };
    let positive = get_param(&params, "sign") != Some("minus");
    state::with_session(|s| match s.player(&id) {
        Some(player) => render_score_modal(player, positive, "", false),
        None => r#"<span class="text-rose-600">Unknown player</span>"#.to_string(),
    })
}

// ── POST /api/score ────────────────────────────────────────────────

/// Handle POST /api/score
/// Body params:
///   - action=apply&player={id}&points={n}&sign={plus|minus} → record a round score
///   - action=undo&player={id}                               → drop the last round score
///
/// Returns the re-rendered board. Unparseable points keep the modal open
/// with the input intact. Scoring is ignored outside a match.
pub fn handle_score_post(body: &str) -> String {
    if !state::with_session(|s| s.is_playing) {
        return render_board(None);
    }
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");
    let id = match get_param(&params, "player") {
        Some(s) if !s.is_empty() => PlayerId::from(s),
        _ => return r#"<span class="text-rose-600">Missing player parameter</span>"#.to_string(),
    };

    match action {
        "apply" => {
            let points = get_param(&params, "points").unwrap_or("");
            let positive = get_param(&params, "sign") != Some("minus");
            if parse_round_points(points).is_none() {
                let modal = state::with_session(|s| {
                    s.player(&id).map(|p| render_score_modal(p, positive, points, true))
                });
                return render_board(modal);
            }
            let changed = state::dispatch(Action::ApplyRoundScore {
                player: id,
                magnitude: points.to_string(),
                positive,
            });
            with_persist(render_board(None), changed)
        }
        "undo" => {
            let changed = state::dispatch(Action::UndoLastScore(id));
            with_persist(render_board(None), changed)
        }
        _ => render_board(None),
    }
}

// ── Modal rendering ────────────────────────────────────────────────

/// Scoring modal. `value` refills the input after a rejected entry.
pub fn render_score_modal(player: &Player, positive: bool, value: &str, invalid: bool) -> String {
    let sign = if positive { "plus" } else { "minus" };
    let pid = id_param(player.id.as_str());
    let mut html = String::with_capacity(2048);

    html.push_str(
        r#"<div class="fixed inset-0 bg-slate-900/60 backdrop-blur-sm flex items-center justify-center p-4 z-[60]">"#,
    );
    html.push_str(r#"<div class="bg-white rounded-[2rem] p-8 w-full max-w-sm shadow-2xl">"#);

    html.push_str(r#"<div class="flex justify-between items-center mb-6">"#);
    html.push_str(&format!(
        r#"<h3 class="font-black text-xl text-slate-900">{}</h3>"#,
        escape_html(&player.name)
    ));
    html.push_str(
        r#"<button class="p-2 bg-slate-100 rounded-full text-slate-400" aria-label="Close" onclick="document.getElementById('score-modal').innerHTML = ''">&#x2715;</button>"#,
    );
    html.push_str(r#"</div>"#);

    let label = if positive { "Points gained" } else { "Points lost" };
    html.push_str(&format!(
        r#"<label class="block text-xs font-bold text-slate-500 uppercase mb-1" for="roundPoints">{}</label>"#,
        label
    ));
    html.push_str(&format!(
        r#"<input type="number" inputmode="numeric" id="roundPoints" placeholder="0" value="{}" autofocus class="w-full text-4xl font-black p-4 bg-slate-100 rounded-2xl outline-none mb-2">"#,
        escape_html(value)
    ));
    if invalid {
        html.push_str(r#"<p class="text-xs text-rose-600 mb-2">Enter a whole number</p>"#);
    }

    html.push_str(r#"<div class="flex justify-end mb-4">"#);
    html.push_str(&format!(
        r#"<button class="py-4 w-[100px] rounded-2xl font-bold bg-green-600 text-white shadow-lg" onclick="htmx.ajax('POST', '/api/score', {{values: {{action: 'apply', player: decodeURIComponent('{}'), sign: '{}', points: document.getElementById('roundPoints').value}}, target: '#board', swap: 'innerHTML'}})">Save</button>"#,
        pid, sign
    ));
    html.push_str(r#"</div>"#);

    if !player.history.is_empty() {
        html.push_str(&format!(
            r#"<button class="w-full py-3 bg-slate-100 text-slate-500 rounded-xl font-bold" onclick="htmx.ajax('POST', '/api/score', {{values: {{action: 'undo', player: decodeURIComponent('{}')}}, target: '#board', swap: 'innerHTML'}})">&#x21BA; Undo Round (last score)</button>"#,
            pid
        ));
    }

    html.push_str(r#"</div></div>"#);
    html
}
