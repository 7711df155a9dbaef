//! Line based operator console. Stands in for a graphical front end: every
//! line is one operator action, the output is a plain text rendering of the
//! current screen.

use std::fmt::Write;

use crate::app::{App, AppError, DiscardRequest, Screen};
use crate::ticker::{Tick, TimerSlot};

#[derive(Debug, clap::Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Show the home screen
    Home,
    /// Continue the stored competition
    Resume,
    /// Start setting up a new competition
    New,
    /// Setup: competition title
    Title { words: Vec<String> },
    /// Setup: number of teams
    Teams {
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Setup: number of rounds
    Rounds {
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Setup: rename a team
    TeamName { team: usize, words: Vec<String> },
    /// Setup: team members
    TeamMembers { team: usize, words: Vec<String> },
    /// Setup: team color as hex
    TeamColor { team: usize, color: String },
    /// Setup: rename a round
    RoundName { round: usize, words: Vec<String> },
    /// Setup: next wizard step
    Next,
    /// Setup: previous wizard step
    Back,
    /// Setup: create the competition and start scoring
    Start,
    /// Add points to a team in the current round
    Add {
        team: usize,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Type a team's score for the current round
    Set {
        team: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Go to the next round
    NextRound,
    /// Go to the previous round
    PrevRound,
    /// Move a team up in the display order
    Up { team: usize },
    /// Move a team down in the display order
    Down { team: usize },
    /// Control the round timer
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },
    /// Control the mini-game
    Mini {
        #[command(subcommand)]
        action: MiniAction,
    },
    /// Finish the competition and show the summary
    Finish,
    /// Show the current standings
    Standings,
    /// Show the running totals per round
    History,
    /// Switch between light and dark theme
    Theme,
    /// Delete the stored competition (asks for confirmation)
    Discard,
    /// Confirm a pending discard
    Confirm,
    Quit,
}

#[derive(Debug, clap::Subcommand)]
enum TimerAction {
    Start,
    Pause,
    Reset {
        #[arg(allow_negative_numbers = true)]
        seconds: Option<i64>,
    },
    Adjust {
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum MiniAction {
    Open,
    Add {
        team: usize,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },
    Close,
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Reply {
    /// Show the current screen
    Screen,
    Text(String),
    Quit,
}

#[derive(Debug, Default)]
pub struct Console {
    pending_discard: Option<DiscardRequest>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one line of input against the app and returns what to print.
    pub async fn handle(&mut self, app: &mut App, input: &str) -> (Flow, String) {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.is_empty() {
            return (Flow::Continue, String::new());
        }

        let line = match <Line as clap::Parser>::try_parse_from(words) {
            Ok(l) => l,
            Err(e) => return (Flow::Continue, e.to_string()),
        };

        tracing::debug!(command = ?line.command, "Handling command");

        let pending = self.pending_discard.take();
        let (flow, mut output) = match self.run(app, line.command, pending).await {
            Ok(Reply::Screen) => (Flow::Continue, render(app)),
            Ok(Reply::Text(text)) => (Flow::Continue, text),
            Ok(Reply::Quit) => (Flow::Quit, String::new()),
            Err(e) => {
                tracing::warn!("Command failed: {}", e);
                (Flow::Continue, format!("error: {}", e))
            }
        };

        if let Some(request) = &self.pending_discard {
            let _ = write!(
                output,
                "\nDelete \"{}\" for good? Type `confirm` to delete, anything else keeps it.",
                request.title()
            );
        }

        (flow, output)
    }

    /// Applies a tick from the ticker and returns what to print, if anything.
    pub fn on_tick(&mut self, app: &mut App, tick: Tick) -> Option<String> {
        let slot = tick.slot;
        let screen = app.scoring_mut()?;
        let expired = screen.on_tick(tick);
        let timer = screen.timer(slot)?;

        if expired {
            Some(format!("{:?} timer: time is up", slot))
        } else if timer.is_running() && timer.is_critical() {
            Some(format!("{:?} timer: {}", slot, timer))
        } else {
            None
        }
    }

    async fn run(
        &mut self,
        app: &mut App,
        command: Command,
        pending: Option<DiscardRequest>,
    ) -> Result<Reply, AppError> {
        match command {
            Command::Home => app.go_home(),
            Command::Resume => {
                app.resume();
            }
            Command::New => app.begin_setup(),
            Command::Title { words } => setup(app)?.set_title(words.join(" ")),
            Command::Teams { count } => {
                setup(app)?.set_team_count(count);
            }
            Command::Rounds { count } => {
                setup(app)?.set_round_count(count);
            }
            Command::TeamName { team, words } => {
                let setup = setup(app)?;
                let idx = draft_team(setup, team)?;
                setup.set_team_name(idx, words.join(" "));
            }
            Command::TeamMembers { team, words } => {
                let setup = setup(app)?;
                let idx = draft_team(setup, team)?;
                setup.set_team_members(idx, words.join(" "));
            }
            Command::TeamColor { team, color } => {
                let setup = setup(app)?;
                let idx = draft_team(setup, team)?;
                if !setup.set_team_color(idx, &color) {
                    return Err(AppError::InvalidColor(color));
                }
            }
            Command::RoundName { round, words } => {
                let setup = setup(app)?;
                let idx = index(round)
                    .filter(|idx| *idx < setup.rounds().len())
                    .ok_or(AppError::UnknownRound(round))?;
                setup.set_round_name(idx, words.join(" "));
            }
            Command::Next => setup(app)?.next_step(),
            Command::Back => {
                if setup(app)?.previous_step() == crate::setup::Navigation::Cancel {
                    app.go_home();
                }
            }
            Command::Start => app.start_competition().await?,
            Command::Add { team, delta } => {
                let team = team_id(app, team)?;
                app.adjust_score(&team, delta).await?;
            }
            Command::Set { team, value } => {
                let team = team_id(app, team)?;
                app.enter_score(&team, &value).await?;
            }
            Command::NextRound => {
                scoring(app)?.next_round();
            }
            Command::PrevRound => {
                scoring(app)?.previous_round();
            }
            Command::Up { team } => {
                let team = team_id(app, team)?;
                scoring(app)?.move_up(&team);
            }
            Command::Down { team } => {
                let team = team_id(app, team)?;
                scoring(app)?.move_down(&team);
            }
            Command::Timer { action } => timer(app, TimerSlot::Round, action)?,
            Command::Mini { action } => match action {
                MiniAction::Open => {
                    app.open_mini_game();
                }
                MiniAction::Add { team, delta } => {
                    let team = team_id(app, team)?;
                    scoring(app)?.update_tally(&team, delta);
                }
                MiniAction::Timer { action } => timer(app, TimerSlot::MiniGame, action)?,
                MiniAction::Close => {
                    scoring(app)?.close_mini_game();
                }
                MiniAction::Finalize => {
                    app.finalize_mini_game().await?;
                }
            },
            Command::Finish => app.finish().await?,
            Command::Standings => {
                let competition = app.competition().ok_or(AppError::WrongScreen)?;
                return Ok(Reply::Text(render_standings(competition)));
            }
            Command::History => {
                let competition = app.competition().ok_or(AppError::WrongScreen)?;
                return Ok(Reply::Text(render_history(competition)));
            }
            Command::Theme => {
                app.toggle_theme().await?;
            }
            Command::Discard => {
                self.pending_discard = app.request_discard();
            }
            Command::Confirm => {
                if let Some(request) = pending {
                    app.discard(request.confirm()).await?;
                }
            }
            Command::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Screen)
    }
}

/// Turns a 1-based number typed by the operator into an index.
fn index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}

fn draft_team(setup: &crate::setup::SetupScreen, number: usize) -> Result<usize, AppError> {
    index(number)
        .filter(|idx| *idx < setup.teams().len())
        .ok_or(AppError::UnknownTeam(number))
}

fn setup(app: &mut App) -> Result<&mut crate::setup::SetupScreen, AppError> {
    app.setup_mut().ok_or(AppError::WrongScreen)
}

fn scoring(app: &mut App) -> Result<&mut crate::scoreboard::ScoringScreen, AppError> {
    app.scoring_mut().ok_or(AppError::WrongScreen)
}

/// Resolves a 1-based team number in the competition's team order.
fn team_id(app: &App, number: usize) -> Result<scoring::TeamId, AppError> {
    app.competition()
        .zip(index(number))
        .and_then(|(c, idx)| c.teams.get(idx))
        .map(|t| t.id)
        .ok_or(AppError::UnknownTeam(number))
}

fn timer(app: &mut App, slot: TimerSlot, action: TimerAction) -> Result<(), AppError> {
    let screen = scoring(app)?;
    match action {
        TimerAction::Start => screen.start_timer(slot),
        TimerAction::Pause => screen.pause_timer(slot),
        TimerAction::Reset { seconds } => screen.reset_timer(slot, seconds),
        TimerAction::Adjust { delta } => screen.adjust_timer(slot, delta),
    };
    Ok(())
}

/// Plain text rendering of the current screen.
pub fn render(app: &App) -> String {
    let mut out = String::new();

    match app.screen() {
        Screen::Home => {
            let _ = writeln!(out, "== Home ({} theme)", app.theme().as_str());
            match app.home_info() {
                Some(info) => {
                    let _ = writeln!(
                        out,
                        "Stored: {} ({} teams, {} rounds{})",
                        info.title,
                        info.teams,
                        info.rounds,
                        if info.finished { ", finished" } else { "" }
                    );
                }
                None => {
                    let _ = writeln!(out, "No competition yet, type `new` to set one up.");
                }
            }
        }
        Screen::Setup(setup) => {
            let _ = writeln!(out, "== Setup ({:?})", setup.step());
            let _ = writeln!(out, "Title: {}", setup.title());
            for (idx, team) in setup.teams().iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  Team {:>2}: {} {} [{}]",
                    idx + 1,
                    team.name,
                    team.color,
                    team.members
                );
            }
            for (idx, round) in setup.rounds().iter().enumerate() {
                let _ = writeln!(out, "  Round {:>2}: {}", idx + 1, round);
            }
        }
        Screen::Scoring(screen) => {
            if let Some(competition) = app.competition() {
                render_scoring(&mut out, screen, competition);
            }
        }
        Screen::Summary => {
            if let Some(summary) = app.summary() {
                render_summary(&mut out, &summary);
            }
        }
    }

    out
}

fn render_scoring(
    out: &mut String,
    screen: &crate::scoreboard::ScoringScreen,
    competition: &scoring::Competition,
) {
    let _ = writeln!(out, "== {}", competition.title);

    let totals: Vec<String> = screen
        .live_totals(competition)
        .into_iter()
        .map(|t| format!("{} {}", t.name, t.total))
        .collect();
    let _ = writeln!(out, "Totals: {}", totals.join(" | "));

    if let Some(round) = screen.current_round(competition) {
        let _ = writeln!(
            out,
            "Round {}/{}: {}",
            screen.round_index() + 1,
            competition.rounds.len(),
            round.name
        );

        for team in screen.display_teams(competition) {
            let number = competition
                .teams
                .iter()
                .position(|t| t.id == team.id)
                .map(|i| i + 1)
                .unwrap_or(0);
            let _ = writeln!(
                out,
                "  [{}] {:<16} {:>5}",
                number,
                team.name,
                round.score(&team.id)
            );
        }
    }

    if let Some(timer) = screen.timer(TimerSlot::Round) {
        let _ = writeln!(out, "Timer: {} ({:?})", timer, timer.state());
    }

    if let Some(session) = screen.mini_game() {
        let _ = writeln!(out, "-- Mini-game, timer {} ({:?})", session.timer, session.timer.state());
        for team in session.rank(&competition.teams) {
            let _ = writeln!(out, "  {:<16} {:>4}", team.name, session.tally(&team.id));
        }
    }

    if screen.can_finish() {
        let _ = writeln!(out, "Last round, type `finish` to end the competition.");
    }
}

fn render_summary(out: &mut String, summary: &common::summary::Summary) {
    let _ = writeln!(out, "== {} (final)", summary.title);

    for row in summary.standings.iter() {
        let _ = writeln!(out, "  {:>2}. {:<16} {:>6}", row.rank, row.name, row.total);
    }

    let _ = writeln!(out, "Running totals:");
    for row in summary.chart.iter() {
        let values: Vec<String> = row
            .values
            .iter()
            .map(|(team, score)| format!("{} {}", team, score))
            .collect();
        let _ = writeln!(out, "  {:<12} {}", row.round, values.join(" | "));
    }
}

fn render_standings(competition: &scoring::Competition) -> String {
    let mut out = String::new();
    for standing in scoring::aggregate::standings(competition) {
        let _ = writeln!(
            out,
            "  {:>2}. {:<16} {:>6}",
            standing.rank, standing.team.name, standing.total
        );
    }
    out
}

fn render_history(competition: &scoring::Competition) -> String {
    let mut out = String::new();
    for point in scoring::aggregate::cumulative_history(competition) {
        let values: Vec<String> = point
            .totals
            .iter()
            .map(|t| format!("{} {}", t.team_name, t.score))
            .collect();
        let _ = writeln!(out, "  {:<12} {}", point.round_name, values.join(" | "));
    }
    out
}
