use common::summary::{ChartRow, StandingRow, Summary, TeamSeries};

const PODIUM_PLACES: usize = 3;

/// Projects a competition into what the summary screen shows.
pub fn build(competition: &scoring::Competition) -> Summary {
    let standings: Vec<StandingRow> = scoring::aggregate::standings(competition)
        .into_iter()
        .map(|s| StandingRow {
            rank: s.rank,
            team_id: s.team.id.to_string(),
            name: s.team.name.clone(),
            members: s.team.members.clone(),
            color: s.team.color.clone(),
            total: s.total,
        })
        .collect();

    let history = scoring::aggregate::cumulative_history(competition);

    let chart = history
        .iter()
        .map(|point| ChartRow {
            round: point.round_name.clone(),
            values: point
                .totals
                .iter()
                .map(|t| (t.team_name.clone(), t.score))
                .collect(),
        })
        .collect();

    let series = competition
        .teams
        .iter()
        .map(|team| TeamSeries {
            team: team.name.clone(),
            color: team.color.clone(),
            points: history
                .iter()
                .map(|point| {
                    (
                        point.round_name.clone(),
                        point.score_of(&team.id).unwrap_or(0),
                    )
                })
                .collect(),
        })
        .collect();

    Summary {
        title: competition.title.clone(),
        finished: competition.finished,
        podium: standings.iter().take(PODIUM_PLACES).cloned().collect(),
        standings,
        chart,
        series,
    }
}
