//! Read-only projections over a [`Competition`] snapshot.
//!
//! Nothing in here caches. Every call walks the rounds again so the results are
//! always consistent with the snapshot, including after edits to earlier rounds.

use crate::model::{Competition, RoundId, Team, TeamId};

pub fn total_score(competition: &Competition, team: &TeamId) -> i64 {
    competition.rounds.iter().map(|r| r.score(team)).sum()
}

/// Totals of every team, in team order.
pub fn totals(competition: &Competition) -> Vec<(TeamId, i64)> {
    competition
        .teams
        .iter()
        .map(|t| (t.id, total_score(competition, &t.id)))
        .collect()
}

/// All teams ordered by total score, highest first.
///
/// Teams with equal totals stay in the order they have in the competition.
pub fn leaderboard(competition: &Competition) -> Vec<&Team> {
    let mut ranked: Vec<(&Team, i64)> = competition
        .teams
        .iter()
        .map(|t| (t, total_score(competition, &t.id)))
        .collect();

    // sort_by is stable
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));

    ranked.into_iter().map(|(t, _)| t).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing<'c> {
    /// 1-based, tied totals share the rank of the first team with that total
    pub rank: usize,
    pub team: &'c Team,
    pub total: i64,
}

pub fn standings(competition: &Competition) -> Vec<Standing<'_>> {
    let mut result: Vec<Standing<'_>> = Vec::with_capacity(competition.teams.len());

    for (idx, team) in leaderboard(competition).into_iter().enumerate() {
        let total = total_score(competition, &team.id);
        let rank = match result.last() {
            Some(prev) if prev.total == total => prev.rank,
            _ => idx + 1,
        };

        result.push(Standing { rank, team, total });
    }

    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPoint {
    pub round_id: RoundId,
    pub round_name: String,
    /// Running total of every team through this round, in team order
    pub totals: Vec<CumulativeScore>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeScore {
    pub team_id: TeamId,
    pub team_name: String,
    pub score: i64,
}

impl HistoryPoint {
    pub fn score_of(&self, team: &TeamId) -> Option<i64> {
        self.totals
            .iter()
            .find(|t| &t.team_id == team)
            .map(|t| t.score)
    }
}

/// Running totals after every round, one entry per round in play order.
pub fn cumulative_history(competition: &Competition) -> Vec<HistoryPoint> {
    let mut running = vec![0i64; competition.teams.len()];

    competition
        .rounds
        .iter()
        .map(|round| {
            let totals = competition
                .teams
                .iter()
                .zip(running.iter_mut())
                .map(|(team, acc)| {
                    *acc += round.score(&team.id);

                    CumulativeScore {
                        team_id: team.id,
                        team_name: team.name.clone(),
                        score: *acc,
                    }
                })
                .collect();

            HistoryPoint {
                round_id: round.id,
                round_name: round.name.clone(),
                totals,
            }
        })
        .collect()
}
