use std::collections::BTreeMap;

use crate::model::{Team, TeamId};
use crate::timer::Timer;

/// A timed side game played during one round.
///
/// Tallies live here until [`MiniGameSession::finalize`] hands them over; the
/// session never touches a competition itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniGameSession {
    tallies: BTreeMap<TeamId, u32>,
    pub timer: Timer,
}

impl MiniGameSession {
    pub const DEFAULT_DURATION: u32 = 60;

    pub fn new<'t, I>(teams: I, duration: u32) -> Self
    where
        I: IntoIterator<Item = &'t Team>,
    {
        Self {
            tallies: teams.into_iter().map(|t| (t.id, 0)).collect(),
            timer: Timer::new(duration),
        }
    }

    pub fn tally(&self, team: &TeamId) -> u32 {
        self.tallies.get(team).copied().unwrap_or(0)
    }

    pub fn tallies(&self) -> &BTreeMap<TeamId, u32> {
        &self.tallies
    }

    /// Adds `delta` to the tally of `team`, clamped at zero.
    ///
    /// Returns the new tally, or `None` if the team is not part of the session.
    pub fn update_tally(&mut self, team: &TeamId, delta: i64) -> Option<u32> {
        let tally = match self.tallies.get_mut(team) {
            Some(t) => t,
            None => {
                tracing::warn!(%team, "Ignoring mini-game update for unknown team");
                return None;
            }
        };

        let next = i64::from(*tally)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX)) as u32;
        *tally = next;

        Some(next)
    }

    /// Teams by tally, highest first. Equal tallies keep the given order.
    pub fn rank<'t>(&self, teams: &'t [Team]) -> Vec<&'t Team> {
        let mut ranked: Vec<&Team> = teams.iter().collect();
        ranked.sort_by_key(|t| std::cmp::Reverse(self.tally(&t.id)));
        ranked
    }

    /// 1-based position of `team` in [`MiniGameSession::rank`].
    pub fn rank_of(&self, teams: &[Team], team: &TeamId) -> Option<usize> {
        self.rank(teams)
            .iter()
            .position(|t| &t.id == team)
            .map(|idx| idx + 1)
    }

    pub fn finalize(self) -> BTreeMap<TeamId, u32> {
        tracing::info!(teams = self.tallies.len(), "Finalized mini-game");
        self.tallies
    }

    pub fn discard(self) {
        tracing::info!("Discarded mini-game");
    }
}
