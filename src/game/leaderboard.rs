//! Derived leaderboard: leader, underdog, and progress toward the target.
//! Recomputed from the session on every render, never stored.

use crate::game::player::Player;
use crate::game::session::Session;

pub const CHEER_UP_MESSAGES: [&str; 7] = [
    "Coming for that comeback!",
    "Slow and steady wins the race!",
    "The comeback will be legendary!",
    "Just getting warmed up!",
    "Saving the best for last!",
    "Plotting a master move...",
    "Don't count them out yet!",
];

#[derive(Debug)]
pub struct Leaderboard<'a> {
    /// Highest score first. Equal scores keep roster order.
    pub sorted_by_score: Vec<&'a Player>,
    target_score: i64,
    player_count: usize,
}

impl<'a> Leaderboard<'a> {
    pub fn new(session: &'a Session) -> Self {
        let mut sorted_by_score: Vec<&Player> = session.players.iter().collect();
        // `sort_by` is stable.
        sorted_by_score.sort_by(|a, b| b.score.cmp(&a.score));
        Self {
            sorted_by_score,
            target_score: session.target_score,
            player_count: session.players.len(),
        }
    }

    pub fn leader(&self) -> Option<&'a Player> {
        self.sorted_by_score.first().copied()
    }

    /// Lowest scorer, shown only when there is more than one player and it is
    /// not also the leader.
    pub fn underdog(&self) -> Option<&'a Player> {
        if self.sorted_by_score.len() < 2 {
            return None;
        }
        let last = self.sorted_by_score.last().copied()?;
        match self.leader() {
            Some(leader) if leader.id == last.id => None,
            _ => Some(last),
        }
    }

    /// Leader's score as a percentage of the target, capped at 100.
    pub fn leader_progress(&self) -> f64 {
        let Some(leader) = self.leader() else {
            return 0.0;
        };
        if self.target_score <= 0 {
            return 100.0;
        }
        let pct = leader.score as f64 / self.target_score as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Encouragement line for the underdog, picked from the score and the
    /// roster size so the same state always shows the same message.
    pub fn underdog_message(&self) -> Option<&'static str> {
        let underdog = self.underdog()?;
        let n = CHEER_UP_MESSAGES.len() as i64;
        let count = (self.player_count as i64).rem_euclid(n);
        let idx = (underdog.score.rem_euclid(n) + count).rem_euclid(n);
        Some(CHEER_UP_MESSAGES[idx as usize])
    }
}
