//! The game session and its transitions.
//!
//! Every change goes through [`reduce`], a pure `(Session, Action) -> Session`
//! function. After the action is applied, `reduce` runs the win check, so the
//! winner can never lag behind the scores. Persisting the result is the
//! caller's job.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::game::player::{Player, PlayerId};

/// Direction for roster reordering: `Up` moves toward the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" | "-1" => Some(Direction::Up),
            "down" | "1" | "+1" => Some(Direction::Down),
            _ => None,
        }
    }

    fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddPlayer { name: String, image: Option<String> },
    RemovePlayer(PlayerId),
    MovePlayer { index: usize, direction: Direction },
    SetTarget(i64),
    StartGame,
    /// Manually end the match, naming the winner (usually the current leader).
    EndGame(PlayerId),
    ReturnToRoster,
    /// `magnitude` is the raw text from the score input.
    ApplyRoundScore { player: PlayerId, magnitude: String, positive: bool },
    UndoLastScore(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Display and turn order.
    pub players: Vec<Player>,
    pub target_score: i64,
    pub is_playing: bool,
    pub winner: Option<PlayerId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default().default_target)
    }
}

impl Session {
    pub fn new(target_score: i64) -> Self {
        Self {
            players: Vec::new(),
            target_score,
            is_playing: false,
            winner: None,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.as_ref().and_then(|id| self.player(id))
    }

    /// While a match is running and undecided, the first player (in roster
    /// order) at or above the target becomes the winner.
    pub fn settle_winner(&mut self) {
        if !self.is_playing || self.winner.is_some() {
            return;
        }
        if let Some(p) = self.players.iter().find(|p| p.score >= self.target_score) {
            log::debug!("{} reached {} and wins", p.name, self.target_score);
            self.winner = Some(p.id.clone());
        }
    }

    fn add_player(&mut self, name: &str, image: Option<String>, config: &Config) {
        if let Some(player) = Player::new(name, image, &config.fallback_avatar_url) {
            self.players.push(player);
        }
    }

    fn remove_player(&mut self, id: &PlayerId) {
        self.players.retain(|p| &p.id != id);
    }

    fn move_player(&mut self, index: usize, direction: Direction) {
        if self.is_playing || index >= self.players.len() {
            return;
        }
        let Some(target) = index.checked_add_signed(direction.offset()) else {
            return;
        };
        if target >= self.players.len() {
            return;
        }
        self.players.swap(index, target);
    }

    fn set_target(&mut self, value: i64) {
        if value > 0 {
            self.target_score = value;
        }
    }

    fn start_game(&mut self) {
        if self.players.is_empty() {
            return;
        }
        for p in &mut self.players {
            p.reset_scores();
        }
        self.is_playing = true;
        self.winner = None;
    }

    fn end_game(&mut self, id: &PlayerId) {
        if self.player(id).is_some() {
            self.winner = Some(id.clone());
        }
    }

    fn return_to_roster(&mut self) {
        self.is_playing = false;
        self.winner = None;
    }

    fn apply_round_score(&mut self, id: &PlayerId, magnitude: &str, positive: bool) {
        let Some(points) = parse_round_points(magnitude) else {
            return;
        };
        let delta = if positive { Some(points) } else { points.checked_neg() };
        let Some(delta) = delta else {
            return;
        };
        if let Some(p) = self.player_mut(id) {
            if p.score.checked_add(delta).is_some() {
                p.push_round(delta);
            }
        }
    }

    fn undo_last_score(&mut self, id: &PlayerId) {
        if let Some(p) = self.player_mut(id) {
            p.pop_round();
        }
    }
}

/// Parse the score input. Whitespace around the number is ignored; anything
/// else that is not a plain integer is rejected.
pub fn parse_round_points(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

/// Apply one action and then run the win check.
pub fn reduce(mut session: Session, action: &Action, config: &Config) -> Session {
    log::debug!("reduce {:?}", action);
    match action {
        Action::AddPlayer { name, image } => session.add_player(name, image.clone(), config),
        Action::RemovePlayer(id) => session.remove_player(id),
        Action::MovePlayer { index, direction } => session.move_player(*index, *direction),
        Action::SetTarget(value) => session.set_target(*value),
        Action::StartGame => session.start_game(),
        Action::EndGame(id) => session.end_game(id),
        Action::ReturnToRoster => session.return_to_roster(),
        Action::ApplyRoundScore { player, magnitude, positive } => {
            session.apply_round_score(player, magnitude, *positive)
        }
        Action::UndoLastScore(id) => session.undo_last_score(id),
    }
    session.settle_winner();
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> (Session, Config) {
        let config = Config::default();
        let mut s = Session::default();
        for name in names {
            s = reduce(
                s,
                &Action::AddPlayer { name: name.to_string(), image: None },
                &config,
            );
        }
        (s, config)
    }

    fn score(s: Session, idx: usize, points: &str, positive: bool, config: &Config) -> Session {
        let player = s.players[idx].id.clone();
        reduce(
            s,
            &Action::ApplyRoundScore { player, magnitude: points.to_string(), positive },
            config,
        )
    }

    fn names(s: &Session) -> Vec<&str> {
        s.players.iter().map(|p| p.name.as_str()).collect()
    }

    fn assert_in_sync(s: &Session) {
        for p in &s.players {
            assert_eq!(Some(p.score), p.history_total(), "{} out of sync", p.name);
        }
    }

    #[test]
    fn add_player_trims_and_appends() {
        let (s, _) = roster(&["Bo", "  Alice  "]);
        assert_eq!(names(&s), vec!["Bo", "Alice"]);
        assert_eq!(s.players[1].score, 0);
        assert!(s.players[1].history.is_empty());
    }

    #[test]
    fn add_blank_player_is_noop() {
        let (s, config) = roster(&["Bo"]);
        let after = reduce(
            s.clone(),
            &Action::AddPlayer { name: "   ".into(), image: None },
            &config,
        );
        assert_eq!(after, s);
    }

    #[test]
    fn remove_player_by_id() {
        let (s, config) = roster(&["A", "B", "C"]);
        let id = s.players[1].id.clone();
        let s = reduce(s, &Action::RemovePlayer(id), &config);
        assert_eq!(names(&s), vec!["A", "C"]);
        let s2 = reduce(s.clone(), &Action::RemovePlayer("missing".into()), &config);
        assert_eq!(s2, s);
    }

    #[test]
    fn move_player_swaps_neighbours() {
        let (s, config) = roster(&["A", "B", "C"]);
        let s = reduce(s, &Action::MovePlayer { index: 0, direction: Direction::Down }, &config);
        assert_eq!(names(&s), vec!["B", "A", "C"]);
        let s = reduce(s, &Action::MovePlayer { index: 2, direction: Direction::Up }, &config);
        assert_eq!(names(&s), vec!["B", "C", "A"]);
    }

    #[test]
    fn move_player_at_boundaries_is_noop() {
        let (s, config) = roster(&["A", "B", "C"]);
        let up = reduce(s.clone(), &Action::MovePlayer { index: 0, direction: Direction::Up }, &config);
        assert_eq!(up, s);
        let down =
            reduce(s.clone(), &Action::MovePlayer { index: 2, direction: Direction::Down }, &config);
        assert_eq!(down, s);
        let past =
            reduce(s.clone(), &Action::MovePlayer { index: 9, direction: Direction::Up }, &config);
        assert_eq!(past, s);
    }

    #[test]
    fn move_player_locked_during_play() {
        let (s, config) = roster(&["A", "B"]);
        let s = reduce(s, &Action::StartGame, &config);
        let moved =
            reduce(s.clone(), &Action::MovePlayer { index: 0, direction: Direction::Down }, &config);
        assert_eq!(names(&moved), vec!["A", "B"]);
    }

    #[test]
    fn start_game_requires_players() {
        let config = Config::default();
        let s = reduce(Session::default(), &Action::StartGame, &config);
        assert!(!s.is_playing);
    }

    #[test]
    fn start_game_resets_scores_but_keeps_identity() {
        let (s, config) = roster(&["A", "B"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "12", true, &config);
        let s = score(s, 1, "3", false, &config);
        let before: Vec<_> =
            s.players.iter().map(|p| (p.id.clone(), p.name.clone(), p.image.clone())).collect();

        let s = reduce(s, &Action::ReturnToRoster, &config);
        assert_eq!(s.players[0].score, 12, "returning to roster keeps scores");
        let s = reduce(s, &Action::StartGame, &config);

        let after: Vec<_> =
            s.players.iter().map(|p| (p.id.clone(), p.name.clone(), p.image.clone())).collect();
        assert_eq!(before, after);
        assert!(s.players.iter().all(|p| p.score == 0 && p.history.is_empty()));
        assert!(s.is_playing);
        assert!(s.winner.is_none());
    }

    #[test]
    fn apply_round_score_signs_and_records() {
        let (s, config) = roster(&["A", "B"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "10", true, &config);
        let s = score(s, 0, " 4 ", false, &config);
        assert_eq!(s.players[0].score, 6);
        assert_eq!(s.players[0].history, vec![10, -4]);
        assert_eq!(s.players[1].score, 0);
        assert_in_sync(&s);
    }

    #[test]
    fn apply_round_score_can_go_negative() {
        let (s, config) = roster(&["A"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "20", false, &config);
        assert_eq!(s.players[0].score, -20);
    }

    #[test]
    fn invalid_round_score_is_noop() {
        let (s, config) = roster(&["A"]);
        let s = reduce(s, &Action::StartGame, &config);
        for bad in ["", "abc", "1.5", "12abc"] {
            let after = score(s.clone(), 0, bad, true, &config);
            assert_eq!(after, s, "input {:?} should be ignored", bad);
        }
    }

    #[test]
    fn undo_restores_previous_state() {
        let (s, config) = roster(&["A"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "7", true, &config);
        let snapshot = (s.players[0].score, s.players[0].history.clone());
        let s = score(s, 0, "3", false, &config);
        let id = s.players[0].id.clone();
        let s = reduce(s, &Action::UndoLastScore(id.clone()), &config);
        assert_eq!((s.players[0].score, s.players[0].history.clone()), snapshot);

        let s = reduce(s, &Action::UndoLastScore(id.clone()), &config);
        let emptied = reduce(s.clone(), &Action::UndoLastScore(id), &config);
        assert_eq!(emptied, s);
        assert_eq!(s.players[0].score, 0);
    }

    #[test]
    fn winner_detected_when_target_crossed() {
        let (s, config) = roster(&["A", "B", "C"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "40", true, &config);
        let s = score(s, 1, "70", true, &config);
        let s = score(s, 2, "60", true, &config);
        assert!(s.winner.is_none());
        let s = score(s, 1, "10", true, &config);
        assert_eq!(s.winner.as_ref(), Some(&s.players[1].id));
        assert_eq!(s.winner().map(|p| p.name.as_str()), Some("B"));
    }

    #[test]
    fn tie_at_target_goes_to_earlier_player() {
        let (mut s, config) = roster(&["A", "B"]);
        s = reduce(s, &Action::StartGame, &config);
        // Both reach the target in one batch before the check runs.
        for p in &mut s.players {
            p.push_round(75);
        }
        let s = reduce(s, &Action::SetTarget(75), &config);
        assert_eq!(s.winner.as_ref(), Some(&s.players[0].id));
    }

    #[test]
    fn winner_is_sticky_until_restart() {
        let (s, config) = roster(&["A", "B"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 1, "80", true, &config);
        let winner = s.winner.clone();
        let s = score(s, 0, "200", true, &config);
        assert_eq!(s.winner, winner);
    }

    #[test]
    fn no_winner_in_setup_mode() {
        let (s, config) = roster(&["A"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, "80", true, &config);
        let s = reduce(s, &Action::ReturnToRoster, &config);
        assert!(!s.is_playing);
        assert!(s.winner.is_none());
    }

    #[test]
    fn end_game_names_winner() {
        let (s, config) = roster(&["A", "B"]);
        let s = reduce(s, &Action::StartGame, &config);
        let id = s.players[1].id.clone();
        let s = reduce(s, &Action::EndGame(id.clone()), &config);
        assert_eq!(s.winner, Some(id));
        let s2 = reduce(s.clone(), &Action::ReturnToRoster, &config);
        let s2 = reduce(s2, &Action::StartGame, &config);
        let s2 = reduce(s2, &Action::EndGame("ghost".into()), &config);
        assert!(s2.winner.is_none());
    }

    #[test]
    fn set_target_rejects_non_positive() {
        let config = Config::default();
        let s = reduce(Session::default(), &Action::SetTarget(150), &config);
        assert_eq!(s.target_score, 150);
        let s = reduce(s, &Action::SetTarget(0), &config);
        let s = reduce(s, &Action::SetTarget(-5), &config);
        assert_eq!(s.target_score, 150);
    }

    #[test]
    fn overflowing_score_is_rejected() {
        let (s, config) = roster(&["A"]);
        let s = reduce(s, &Action::StartGame, &config);
        let s = score(s, 0, &i64::MAX.to_string(), false, &config);
        let s = score(s, 0, "5", false, &config);
        assert_eq!(s.players[0].history.len(), 1);
        let s = score(s, 0, &i64::MIN.to_string(), true, &config);
        assert_in_sync(&s);
    }

    #[test]
    fn direction_parse() {
        assert_eq!(Direction::parse("up"), Some(Direction::Up));
        assert_eq!(Direction::parse("-1"), Some(Direction::Up));
        assert_eq!(Direction::parse("down"), Some(Direction::Down));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
