use std::collections::BTreeMap;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(CompetitionId);
id_type!(TeamId);
id_type!(RoundId);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub scores: BTreeMap<TeamId, i64>,
}

impl Round {
    /// Score of the given team in this round, `0` if the team has no entry.
    pub fn score(&self, team: &TeamId) -> i64 {
        self.scores.get(team).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub title: String,
    pub teams: Vec<Team>,
    pub rounds: Vec<Round>,
    pub finished: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// What the caller provides for every team during setup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamSpec {
    pub name: String,
    pub members: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("a competition needs at least one team")]
    NoTeams,
    #[error("a competition needs at least one round")]
    NoRounds,
}

/// Result of a mutation.
///
/// Both variants carry a complete competition so the caller can always
/// continue with the returned value. `Unchanged` signals that the request
/// referenced something that does not exist (or had nothing to do) and the
/// input was returned as is, so there is nothing to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Applied(Competition),
    Unchanged(Competition),
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn competition(&self) -> &Competition {
        match self {
            Self::Applied(c) | Self::Unchanged(c) => c,
        }
    }

    pub fn into_inner(self) -> Competition {
        match self {
            Self::Applied(c) | Self::Unchanged(c) => c,
        }
    }
}

pub fn create_competition<T, R>(
    title: T,
    team_specs: Vec<TeamSpec>,
    round_names: Vec<R>,
) -> Result<Competition, ModelError>
where
    T: Into<String>,
    R: Into<String>,
{
    if team_specs.is_empty() {
        return Err(ModelError::NoTeams);
    }
    if round_names.is_empty() {
        return Err(ModelError::NoRounds);
    }

    let teams: Vec<Team> = team_specs
        .into_iter()
        .map(|spec| Team {
            id: TeamId::generate(),
            name: spec.name,
            members: spec.members,
            color: spec.color,
        })
        .collect();

    let rounds: Vec<Round> = round_names
        .into_iter()
        .map(|name| Round {
            id: RoundId::generate(),
            name: name.into(),
            scores: teams.iter().map(|t| (t.id, 0)).collect(),
        })
        .collect();

    let competition = Competition {
        id: CompetitionId::generate(),
        title: title.into(),
        teams,
        rounds,
        finished: false,
        created_at: chrono::Utc::now(),
    };

    tracing::info!(
        id = %competition.id,
        teams = competition.teams.len(),
        rounds = competition.rounds.len(),
        "Created competition"
    );

    Ok(competition)
}

impl Competition {
    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    pub fn round(&self, id: &RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| &r.id == id)
    }

    pub fn round_index(&self, id: &RoundId) -> Option<usize> {
        self.rounds.iter().position(|r| &r.id == id)
    }

    /// Replaces the score of `team` in `round` with `value`.
    pub fn set_round_score(&self, round: &RoundId, team: &TeamId, value: i64) -> Mutation {
        self.update_score(round, team, |_| value)
    }

    /// Adds `delta` to the score of `team` in `round`. Not clamped, round
    /// scores may go negative.
    pub fn adjust_round_score(&self, round: &RoundId, team: &TeamId, delta: i64) -> Mutation {
        self.update_score(round, team, |current| current.saturating_add(delta))
    }

    pub fn finish(&self) -> Mutation {
        if self.finished {
            tracing::debug!(id = %self.id, "Competition already finished");
            return Mutation::Unchanged(self.clone());
        }

        tracing::info!(id = %self.id, "Finishing competition");

        Mutation::Applied(Self {
            finished: true,
            ..self.clone()
        })
    }

    fn update_score<F>(&self, round: &RoundId, team: &TeamId, func: F) -> Mutation
    where
        F: FnOnce(i64) -> i64,
    {
        let round_idx = match self.round_index(round) {
            Some(idx) => idx,
            None => {
                tracing::warn!(%round, "Ignoring score update for unknown round");
                return Mutation::Unchanged(self.clone());
            }
        };
        if self.team(team).is_none() {
            tracing::warn!(%team, "Ignoring score update for unknown team");
            return Mutation::Unchanged(self.clone());
        }

        let mut updated = self.clone();
        let scores = &mut updated.rounds[round_idx].scores;
        let current = scores.get(team).copied().unwrap_or(0);
        let next = func(current);
        scores.insert(*team, next);

        tracing::debug!(%round, %team, current, next, "Updated round score");

        Mutation::Applied(updated)
    }
}

pub fn set_round_score(
    competition: &Competition,
    round: &RoundId,
    team: &TeamId,
    value: i64,
) -> Mutation {
    competition.set_round_score(round, team, value)
}

pub fn adjust_round_score(
    competition: &Competition,
    round: &RoundId,
    team: &TeamId,
    delta: i64,
) -> Mutation {
    competition.adjust_round_score(round, team, delta)
}

pub fn finish_competition(competition: &Competition) -> Mutation {
    competition.finish()
}
