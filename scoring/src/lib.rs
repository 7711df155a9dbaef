pub mod aggregate;
pub mod minigame;
pub mod model;
pub mod timer;

pub use model::{
    adjust_round_score, create_competition, finish_competition, set_round_score, Competition,
    CompetitionId, ModelError, Mutation, Round, RoundId, Team, TeamId, TeamSpec,
};
