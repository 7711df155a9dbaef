use crate::scoreboard::TimerSettings;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "scorekeeper", about = "Keeps score of multi-round team competitions")]
pub struct Config {
    /// Folder holding the stored competition and preferences
    #[arg(long, env = "SCOREKEEPER_DATA_DIR", default_value = "data/")]
    pub data_dir: std::path::PathBuf,

    /// Initial duration of the round timer in seconds
    #[arg(long, env = "SCOREKEEPER_ROUND_SECONDS", default_value_t = TimerSettings::default().round)]
    pub round_seconds: u32,

    /// Initial duration of the mini-game timer in seconds
    #[arg(long, env = "SCOREKEEPER_MINI_GAME_SECONDS", default_value_t = TimerSettings::default().mini_game)]
    pub mini_game_seconds: u32,

    #[arg(long, env = "SCOREKEEPER_LOG", default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}

impl Config {
    pub fn timers(&self) -> TimerSettings {
        TimerSettings {
            round: self.round_seconds,
            mini_game: self.mini_game_seconds,
        }
    }
}
