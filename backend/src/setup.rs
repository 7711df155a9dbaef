pub const MIN_TEAMS: usize = 1;
pub const MAX_TEAMS: usize = 10;
pub const MIN_ROUNDS: usize = 1;
pub const MAX_ROUNDS: usize = 20;

const DEFAULT_TITLE: &str = "My Competition";
const DEFAULT_TEAMS: usize = 2;
const DEFAULT_ROUNDS: usize = 3;

/// Colors handed out to new teams, cycled when there are more teams.
pub const PALETTE: [&str; 8] = [
    "#ff5f6d", "#ffc371", "#4facfe", "#00f2fe", "#a18cd1", "#fbc2eb", "#84fab0", "#ff9a9e",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// Title and team/round counts
    Basics,
    /// Names, members and colors
    Details,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub name: String,
    pub members: String,
    pub color: String,
}

impl TeamDraft {
    fn numbered(idx: usize) -> Self {
        Self {
            name: default_team_name(idx),
            members: String::new(),
            color: PALETTE[idx % PALETTE.len()].to_owned(),
        }
    }
}

fn default_team_name(idx: usize) -> String {
    format!("Team {}", idx + 1)
}

fn default_round_name(idx: usize) -> String {
    format!("Round {}", idx + 1)
}

/// State of the setup wizard. Counts are clamped here, before anything
/// reaches the competition model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupScreen {
    step: SetupStep,
    title: String,
    teams: Vec<TeamDraft>,
    rounds: Vec<String>,
}

impl Default for SetupScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupScreen {
    pub fn new() -> Self {
        Self {
            step: SetupStep::Basics,
            title: DEFAULT_TITLE.to_owned(),
            teams: (0..DEFAULT_TEAMS).map(TeamDraft::numbered).collect(),
            rounds: (0..DEFAULT_ROUNDS).map(default_round_name).collect(),
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn next_step(&mut self) {
        self.step = SetupStep::Details;
    }

    /// Going back from the first step leaves the wizard.
    pub fn previous_step(&mut self) -> Navigation {
        match self.step {
            SetupStep::Basics => Navigation::Cancel,
            SetupStep::Details => {
                self.step = SetupStep::Basics;
                Navigation::Stay
            }
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn teams(&self) -> &[TeamDraft] {
        &self.teams
    }

    pub fn rounds(&self) -> &[String] {
        &self.rounds
    }

    /// Grows or shrinks the team list, returns the clamped count.
    pub fn set_team_count(&mut self, count: i64) -> usize {
        let count = clamp_count(count, MIN_TEAMS, MAX_TEAMS);

        if count > self.teams.len() {
            let start = self.teams.len();
            self.teams.extend((start..count).map(TeamDraft::numbered));
        } else {
            self.teams.truncate(count);
        }

        count
    }

    /// Grows or shrinks the round list, returns the clamped count.
    pub fn set_round_count(&mut self, count: i64) -> usize {
        let count = clamp_count(count, MIN_ROUNDS, MAX_ROUNDS);

        if count > self.rounds.len() {
            let start = self.rounds.len();
            self.rounds.extend((start..count).map(default_round_name));
        } else {
            self.rounds.truncate(count);
        }

        count
    }

    pub fn set_team_name(&mut self, idx: usize, name: impl Into<String>) -> bool {
        match self.teams.get_mut(idx) {
            Some(team) => {
                team.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_team_members(&mut self, idx: usize, members: impl Into<String>) -> bool {
        match self.teams.get_mut(idx) {
            Some(team) => {
                team.members = members.into();
                true
            }
            None => false,
        }
    }

    /// Sets a hex color such as `#4facfe`. Colors that do not parse are
    /// rejected and the previous color stays.
    pub fn set_team_color(&mut self, idx: usize, color: &str) -> bool {
        let team = match self.teams.get_mut(idx) {
            Some(t) => t,
            None => return false,
        };

        match colors_transform::Rgb::from_hex_str(color.trim()) {
            Ok(rgb) => {
                team.color = rgb.to_css_hex_string();
                true
            }
            Err(_) => {
                tracing::warn!("Rejecting team color {:?}", color);
                false
            }
        }
    }

    pub fn set_round_name(&mut self, idx: usize, name: impl Into<String>) -> bool {
        match self.rounds.get_mut(idx) {
            Some(round) => {
                *round = name.into();
                true
            }
            None => false,
        }
    }

    /// Creates the competition, filling in defaults for blank names.
    pub fn build(&self) -> Result<scoring::Competition, scoring::ModelError> {
        let title = match self.title.trim() {
            "" => DEFAULT_TITLE.to_owned(),
            t => t.to_owned(),
        };

        let teams = self
            .teams
            .iter()
            .enumerate()
            .map(|(idx, draft)| scoring::TeamSpec {
                name: non_blank(&draft.name).unwrap_or_else(|| default_team_name(idx)),
                members: draft.members.trim().to_owned(),
                color: draft.color.clone(),
            })
            .collect();

        let rounds = self
            .rounds
            .iter()
            .enumerate()
            .map(|(idx, name)| non_blank(name).unwrap_or_else(|| default_round_name(idx)))
            .collect::<Vec<_>>();

        scoring::create_competition(title, teams, rounds)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn clamp_count(count: i64, min: usize, max: usize) -> usize {
    count.clamp(min as i64, max as i64) as usize
}
