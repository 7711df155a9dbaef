use scoring::{Competition, Mutation, TeamId};

use crate::scoreboard::{ScoringScreen, TimerSettings};
use crate::setup::{SetupScreen, SetupStep};
use crate::storage::{Persistence, StorageError};
use crate::ticker::TickSender;

#[derive(Debug)]
pub enum Screen {
    Home,
    Setup(SetupScreen),
    Scoring(ScoringScreen),
    Summary,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Model(#[from] scoring::ModelError),
    #[error("not possible on the current screen")]
    WrongScreen,
    #[error("the competition can only be finished from the last round")]
    NotLastRound,
    #[error("there is no team number {0}")]
    UnknownTeam(usize),
    #[error("there is no round number {0}")]
    UnknownRound(usize),
    #[error("'{0}' is not a hex color")]
    InvalidColor(String),
    #[error("go through the remaining setup steps before starting")]
    SetupIncomplete,
}

/// First half of discarding the active competition. Nothing is removed until
/// the request is confirmed and handed to [`App::discard`].
#[derive(Debug)]
#[must_use]
pub struct DiscardRequest {
    title: String,
}

impl DiscardRequest {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn confirm(self) -> ConfirmedDiscard {
        ConfirmedDiscard { _private: () }
    }
}

#[derive(Debug)]
pub struct ConfirmedDiscard {
    _private: (),
}

/// The application shell: the active competition, the screen being shown and
/// the persisted preferences. Every applied mutation is written through to
/// storage before the call returns.
pub struct App {
    persistence: Persistence,
    competition: Option<Competition>,
    theme: common::Theme,
    screen: Screen,
    settings: TimerSettings,
    ticks: TickSender,
}

impl App {
    #[tracing::instrument(name = "App", skip_all)]
    pub async fn load(
        persistence: Persistence,
        settings: TimerSettings,
        ticks: TickSender,
    ) -> Result<Self, StorageError> {
        let competition = persistence.load_competition().await?;
        let theme = persistence.load_theme().await?;

        tracing::info!(
            has_competition = competition.is_some(),
            theme = theme.as_str(),
            "Loaded state"
        );

        Ok(Self {
            persistence,
            competition,
            theme,
            screen: Screen::Home,
            settings,
            ticks,
        })
    }

    pub fn competition(&self) -> Option<&Competition> {
        self.competition.as_ref()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn theme(&self) -> common::Theme {
        self.theme
    }

    pub fn home_info(&self) -> Option<common::CompetitionInfo> {
        self.competition.as_ref().map(|c| common::CompetitionInfo {
            id: c.id.to_string(),
            title: c.title.clone(),
            finished: c.finished,
            teams: c.teams.len(),
            rounds: c.rounds.len(),
        })
    }

    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
    }

    pub fn begin_setup(&mut self) {
        self.screen = Screen::Setup(SetupScreen::new());
    }

    pub fn setup_mut(&mut self) -> Option<&mut SetupScreen> {
        match &mut self.screen {
            Screen::Setup(setup) => Some(setup),
            _ => None,
        }
    }

    pub fn scoring(&self) -> Option<&ScoringScreen> {
        match &self.screen {
            Screen::Scoring(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn scoring_mut(&mut self) -> Option<&mut ScoringScreen> {
        match &mut self.screen {
            Screen::Scoring(screen) => Some(screen),
            _ => None,
        }
    }

    /// Builds the competition from the last setup step, stores it and opens
    /// the scoring screen. Replaces any previous competition.
    pub async fn start_competition(&mut self) -> Result<(), AppError> {
        let competition = match &self.screen {
            Screen::Setup(setup) if setup.step() == SetupStep::Details => setup.build()?,
            Screen::Setup(_) => return Err(AppError::SetupIncomplete),
            _ => return Err(AppError::WrongScreen),
        };

        self.persistence.save_competition(&competition).await?;

        self.screen = Screen::Scoring(ScoringScreen::new(
            &competition,
            self.settings,
            self.ticks.clone(),
        ));
        self.competition = Some(competition);

        Ok(())
    }

    /// Opens the stored competition where it left off. Returns false if there
    /// is nothing to resume.
    pub fn resume(&mut self) -> bool {
        let competition = match &self.competition {
            Some(c) => c,
            None => return false,
        };

        self.screen = if competition.finished {
            Screen::Summary
        } else {
            Screen::Scoring(ScoringScreen::new(
                competition,
                self.settings,
                self.ticks.clone(),
            ))
        };
        true
    }

    pub async fn adjust_score(&mut self, team: &TeamId, delta: i64) -> Result<bool, AppError> {
        self.apply(|screen, competition| screen.adjust(competition, team, delta))
            .await
    }

    pub async fn enter_score(&mut self, team: &TeamId, text: &str) -> Result<bool, AppError> {
        self.apply(|screen, competition| screen.enter(competition, team, text))
            .await
    }

    pub fn open_mini_game(&mut self) -> bool {
        match (&mut self.screen, &self.competition) {
            (Screen::Scoring(screen), Some(competition)) => screen.open_mini_game(competition),
            _ => false,
        }
    }

    pub async fn finalize_mini_game(&mut self) -> Result<bool, AppError> {
        self.apply_mut(|screen, competition| screen.finalize_mini_game(competition))
            .await
    }

    /// Marks the competition as finished and shows the summary.
    pub async fn finish(&mut self) -> Result<(), AppError> {
        let competition = match (&self.screen, &self.competition) {
            (Screen::Scoring(screen), Some(c)) if screen.can_finish() => c,
            (Screen::Scoring(_), Some(_)) => return Err(AppError::NotLastRound),
            _ => return Err(AppError::WrongScreen),
        };

        let mutation = competition.finish();
        self.commit(mutation).await?;
        self.screen = Screen::Summary;

        Ok(())
    }

    pub fn summary(&self) -> Option<common::summary::Summary> {
        self.competition.as_ref().map(crate::summary::build)
    }

    pub async fn set_theme(&mut self, theme: common::Theme) -> Result<(), AppError> {
        self.persistence.save_theme(theme).await?;
        self.theme = theme;
        Ok(())
    }

    pub async fn toggle_theme(&mut self) -> Result<common::Theme, AppError> {
        let theme = self.theme.toggled();
        self.set_theme(theme).await?;
        Ok(theme)
    }

    pub fn request_discard(&self) -> Option<DiscardRequest> {
        self.competition.as_ref().map(|c| DiscardRequest {
            title: c.title.clone(),
        })
    }

    /// Removes the active competition from memory and storage.
    pub async fn discard(&mut self, _confirmed: ConfirmedDiscard) -> Result<(), AppError> {
        self.persistence.discard_competition().await?;
        self.competition = None;
        self.screen = Screen::Home;

        tracing::info!("Discarded competition");
        Ok(())
    }

    async fn apply<F>(&mut self, func: F) -> Result<bool, AppError>
    where
        F: FnOnce(&ScoringScreen, &Competition) -> Mutation,
    {
        let mutation = match (&self.screen, &self.competition) {
            (Screen::Scoring(screen), Some(competition)) => func(screen, competition),
            _ => return Err(AppError::WrongScreen),
        };

        self.commit(mutation).await
    }

    async fn apply_mut<F>(&mut self, func: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut ScoringScreen, &Competition) -> Mutation,
    {
        let mutation = match (&mut self.screen, &self.competition) {
            (Screen::Scoring(screen), Some(competition)) => func(screen, competition),
            _ => return Err(AppError::WrongScreen),
        };

        self.commit(mutation).await
    }

    /// Keeps the result of a mutation, storing it if anything changed.
    async fn commit(&mut self, mutation: Mutation) -> Result<bool, AppError> {
        let applied = mutation.is_applied();
        let competition = self.competition.insert(mutation.into_inner());

        if applied {
            self.persistence.save_competition(competition).await?;
        }

        Ok(applied)
    }
}
