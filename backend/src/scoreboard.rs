use scoring::minigame::MiniGameSession;
use scoring::timer::Timer;
use scoring::{Competition, Mutation, Round, RoundId, Team, TeamId};

use crate::ticker::{Tick, TickSender, Ticker, TimerSlot};

/// Initial durations of the countdowns, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub round: u32,
    pub mini_game: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            round: 300,
            mini_game: MiniGameSession::DEFAULT_DURATION,
        }
    }
}

#[derive(Debug)]
struct MiniGame {
    round: RoundId,
    session: MiniGameSession,
    ticker: Option<Ticker>,
}

/// State of the scoring screen.
///
/// The screen does not own the competition. Operations that change scores
/// take the current snapshot and hand back a [`Mutation`] for the caller to
/// keep and persist. Tickers are owned here and stop when the screen is
/// dropped.
#[derive(Debug)]
pub struct ScoringScreen {
    round_idx: usize,
    round_count: usize,
    display_order: Vec<TeamId>,
    settings: TimerSettings,
    round_timer: Timer,
    round_ticker: Option<Ticker>,
    mini_game: Option<MiniGame>,
    ticks: TickSender,
}

impl ScoringScreen {
    pub const STEPS: [i64; 4] = [-5, -1, 1, 5];

    pub fn new(competition: &Competition, settings: TimerSettings, ticks: TickSender) -> Self {
        Self {
            round_idx: 0,
            round_count: competition.rounds.len(),
            display_order: competition.teams.iter().map(|t| t.id).collect(),
            settings,
            round_timer: Timer::new(settings.round),
            round_ticker: None,
            mini_game: None,
            ticks,
        }
    }

    pub fn round_index(&self) -> usize {
        self.round_idx
    }

    pub fn current_round<'c>(&self, competition: &'c Competition) -> Option<&'c Round> {
        competition.rounds.get(self.round_idx)
    }

    pub fn next_round(&mut self) -> bool {
        if self.round_idx + 1 >= self.round_count {
            return false;
        }
        self.round_idx += 1;
        true
    }

    pub fn previous_round(&mut self) -> bool {
        if self.round_idx == 0 {
            return false;
        }
        self.round_idx -= 1;
        true
    }

    pub fn is_last_round(&self) -> bool {
        self.round_idx + 1 >= self.round_count
    }

    /// The competition can only be finished from the last round.
    pub fn can_finish(&self) -> bool {
        self.is_last_round()
    }

    /// Adds `delta` to the team's score in the current round.
    pub fn adjust(&self, competition: &Competition, team: &TeamId, delta: i64) -> Mutation {
        match self.current_round(competition) {
            Some(round) => competition.adjust_round_score(&round.id, team, delta),
            None => Mutation::Unchanged(competition.clone()),
        }
    }

    /// Sets the team's score in the current round from typed text. The
    /// leading integer counts (`"12abc"` is 12, `"3.7"` is 3), text without
    /// one counts as 0.
    pub fn enter(&self, competition: &Competition, team: &TeamId, text: &str) -> Mutation {
        let value = leading_integer(text);

        match self.current_round(competition) {
            Some(round) => competition.set_round_score(&round.id, team, value),
            None => Mutation::Unchanged(competition.clone()),
        }
    }

    /// Totals for the header, highest first.
    pub fn live_totals(&self, competition: &Competition) -> Vec<common::LiveTotal> {
        scoring::aggregate::leaderboard(competition)
            .into_iter()
            .map(|team| common::LiveTotal {
                team_id: team.id.to_string(),
                name: team.name.clone(),
                color: team.color.clone(),
                total: scoring::aggregate::total_score(competition, &team.id),
            })
            .collect()
    }

    /// Teams in the order the screen shows them. This order is cosmetic and
    /// never written back to the competition.
    pub fn display_teams<'c>(&self, competition: &'c Competition) -> Vec<&'c Team> {
        let mut teams: Vec<&Team> = self
            .display_order
            .iter()
            .filter_map(|id| competition.team(id))
            .collect();

        for team in competition.teams.iter() {
            if !self.display_order.contains(&team.id) {
                teams.push(team);
            }
        }

        teams
    }

    pub fn move_up(&mut self, team: &TeamId) -> bool {
        match self.display_order.iter().position(|t| t == team) {
            Some(idx) if idx > 0 => {
                self.display_order.swap(idx, idx - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self, team: &TeamId) -> bool {
        match self.display_order.iter().position(|t| t == team) {
            Some(idx) if idx + 1 < self.display_order.len() => {
                self.display_order.swap(idx, idx + 1);
                true
            }
            _ => false,
        }
    }

    pub fn timer(&self, slot: TimerSlot) -> Option<&Timer> {
        match slot {
            TimerSlot::Round => Some(&self.round_timer),
            TimerSlot::MiniGame => self.mini_game.as_ref().map(|m| &m.session.timer),
        }
    }

    pub fn start_timer(&mut self, slot: TimerSlot) -> bool {
        self.with_timer(slot, |t| t.start())
    }

    pub fn pause_timer(&mut self, slot: TimerSlot) -> bool {
        self.with_timer(slot, |t| t.pause())
    }

    /// Resets to `seconds`, or to the configured duration if `None`.
    pub fn reset_timer(&mut self, slot: TimerSlot, seconds: Option<i64>) -> bool {
        self.with_timer(slot, |t| {
            match seconds {
                Some(s) => t.reset(s),
                None => t.restart(),
            };
            true
        })
    }

    pub fn adjust_timer(&mut self, slot: TimerSlot, delta: i64) -> bool {
        self.with_timer(slot, |t| {
            t.adjust(delta);
            true
        })
    }

    /// Handles one tick from a [`Ticker`]. Ticks from a ticker that has
    /// since been stopped are ignored. Returns true if the timer ran out with
    /// this tick.
    pub fn on_tick(&mut self, tick: Tick) -> bool {
        let live = match tick.slot {
            TimerSlot::Round => self.round_ticker.as_ref(),
            TimerSlot::MiniGame => self.mini_game.as_ref().and_then(|m| m.ticker.as_ref()),
        }
        .map(|ticker| ticker.produced(&tick))
        .unwrap_or(false);

        if !live {
            tracing::debug!(?tick, "Ignoring stale tick");
            return false;
        }

        let mut expired = false;
        self.with_timer(tick.slot, |t| {
            let ticked = t.tick();
            expired = ticked && t.is_expired();
            ticked
        });

        if expired {
            tracing::info!(slot = ?tick.slot, "Timer ran out");
        }
        expired
    }

    pub fn is_ticking(&self, slot: TimerSlot) -> bool {
        match slot {
            TimerSlot::Round => self.round_ticker.is_some(),
            TimerSlot::MiniGame => self
                .mini_game
                .as_ref()
                .map(|m| m.ticker.is_some())
                .unwrap_or(false),
        }
    }

    /// Runs `func` on the timer and starts or stops its ticker so that it
    /// ticks exactly while the timer is running.
    fn with_timer<F>(&mut self, slot: TimerSlot, func: F) -> bool
    where
        F: FnOnce(&mut Timer) -> bool,
    {
        let ticks = &self.ticks;
        let (timer, ticker) = match slot {
            TimerSlot::Round => (&mut self.round_timer, &mut self.round_ticker),
            TimerSlot::MiniGame => match self.mini_game.as_mut() {
                Some(m) => (&mut m.session.timer, &mut m.ticker),
                None => return false,
            },
        };

        let changed = func(timer);

        match (timer.is_running(), ticker.is_some()) {
            (true, false) => *ticker = Some(Ticker::spawn(slot, ticks.clone())),
            (false, true) => *ticker = None,
            _ => {}
        };

        changed
    }

    pub fn mini_game(&self) -> Option<&MiniGameSession> {
        self.mini_game.as_ref().map(|m| &m.session)
    }

    /// Opens a mini-game for the current round. Returns false if one is
    /// already open.
    pub fn open_mini_game(&mut self, competition: &Competition) -> bool {
        if self.mini_game.is_some() {
            return false;
        }
        let round = match self.current_round(competition) {
            Some(r) => r.id,
            None => return false,
        };

        tracing::info!(%round, "Opening mini-game");
        self.mini_game = Some(MiniGame {
            round,
            session: MiniGameSession::new(&competition.teams, self.settings.mini_game),
            ticker: None,
        });
        true
    }

    pub fn update_tally(&mut self, team: &TeamId, delta: i64) -> Option<u32> {
        self.mini_game
            .as_mut()
            .and_then(|m| m.session.update_tally(team, delta))
    }

    /// Closes the mini-game without touching any scores.
    pub fn close_mini_game(&mut self) -> bool {
        match self.mini_game.take() {
            Some(m) => {
                m.session.discard();
                true
            }
            None => false,
        }
    }

    /// Closes the mini-game and adds every tally to the round it was opened
    /// for.
    pub fn finalize_mini_game(&mut self, competition: &Competition) -> Mutation {
        let MiniGame { round, session, .. } = match self.mini_game.take() {
            Some(m) => m,
            None => return Mutation::Unchanged(competition.clone()),
        };

        let mut applied = false;
        let mut merged = competition.clone();
        for (team, tally) in session.finalize() {
            merged = match merged.adjust_round_score(&round, &team, i64::from(tally)) {
                Mutation::Applied(c) => {
                    applied = true;
                    c
                }
                Mutation::Unchanged(c) => c,
            };
        }

        if applied {
            Mutation::Applied(merged)
        } else {
            Mutation::Unchanged(merged)
        }
    }
}

/// Parses an optionally signed run of digits at the start of `text`,
/// saturating at the bounds of `i64`.
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_prefix() {
        assert_eq!(12, leading_integer("12abc"));
        assert_eq!(3, leading_integer("3.7"));
        assert_eq!(-5, leading_integer(" -5 "));
        assert_eq!(4, leading_integer("+4"));
        assert_eq!(0, leading_integer("abc"));
        assert_eq!(0, leading_integer("-"));
        assert_eq!(0, leading_integer(""));
        assert_eq!(i64::MAX, leading_integer("99999999999999999999"));
    }
}
