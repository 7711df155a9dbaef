#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub title: String,
    pub finished: bool,
    pub standings: Vec<StandingRow>,
    /// The first three standings
    pub podium: Vec<StandingRow>,
    pub chart: Vec<ChartRow>,
    pub series: Vec<TeamSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StandingRow {
    pub rank: usize,
    pub team_id: String,
    pub name: String,
    pub members: String,
    pub color: String,
    pub total: i64,
}

/// Running totals of all teams after one round, in team order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChartRow {
    pub round: String,
    pub values: Vec<(String, i64)>,
}

/// Running totals of a single team, one point per round.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TeamSeries {
    pub team: String,
    pub color: String,
    pub points: Vec<(String, i64)>,
}
