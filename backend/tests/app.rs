use std::sync::Arc;

use backend::scoreboard::TimerSettings;
use backend::storage::{MemoryStore, Persistence, COMPETITION_KEY};
use backend::{App, AppError, Screen};
use pretty_assertions::assert_eq;

async fn app_with(store: Arc<MemoryStore>) -> App {
    let (ticks, _rx) = backend::ticker::channel();
    App::load(
        Persistence::from_shared(store),
        TimerSettings::default(),
        ticks,
    )
    .await
    .unwrap()
}

fn stored(store: &MemoryStore) -> Option<scoring::Competition> {
    store
        .record(COMPETITION_KEY)
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

/// Runs the setup wizard with three teams and two rounds.
async fn started(store: Arc<MemoryStore>) -> App {
    let mut app = app_with(store).await;

    app.begin_setup();
    let setup = app.setup_mut().unwrap();
    setup.set_title("Game Night");
    setup.set_team_count(3);
    setup.set_round_count(2);
    setup.set_team_name(0, "Red");
    setup.set_team_name(1, "Blue");
    setup.set_team_name(2, "Green");
    setup.next_step();

    app.start_competition().await.unwrap();
    app
}

fn team(app: &App, idx: usize) -> scoring::TeamId {
    app.competition().unwrap().teams[idx].id
}

#[tokio::test]
async fn starts_on_home_without_competition() {
    let app = app_with(Arc::new(MemoryStore::new())).await;

    assert!(matches!(app.screen(), Screen::Home));
    assert_eq!(None, app.home_info());
    assert_eq!(common::Theme::Light, app.theme());
}

#[tokio::test]
async fn starting_stores_competition() {
    let store = Arc::new(MemoryStore::new());
    let app = started(store.clone()).await;

    assert!(matches!(app.screen(), Screen::Scoring(_)));

    let competition = app.competition().unwrap();
    assert_eq!("Game Night", competition.title);
    assert_eq!(3, competition.teams.len());
    assert_eq!(2, competition.rounds.len());
    assert_eq!(Some(competition.clone()), stored(&store));
}

#[tokio::test]
async fn start_outside_setup_is_rejected() {
    let mut app = app_with(Arc::new(MemoryStore::new())).await;

    let result = app.start_competition().await;

    assert!(matches!(result, Err(AppError::WrongScreen)));
}

#[tokio::test]
async fn start_needs_last_setup_step() {
    let store = Arc::new(MemoryStore::new());
    let stored_before = {
        let app = started(store.clone()).await;
        app.competition().cloned()
    };

    let mut app = app_with(store.clone()).await;
    app.begin_setup();

    let result = app.start_competition().await;

    assert!(matches!(result, Err(AppError::SetupIncomplete)));
    assert!(matches!(app.screen(), Screen::Setup(_)));
    assert_eq!(stored_before, stored(&store));
}

#[tokio::test]
async fn score_changes_are_written_through() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;
    let red = team(&app, 0);
    let blue = team(&app, 1);

    assert!(app.adjust_score(&red, 5).await.unwrap());
    assert!(app.adjust_score(&red, -1).await.unwrap());
    assert!(app.enter_score(&blue, "12").await.unwrap());

    let competition = stored(&store).unwrap();
    assert_eq!(4, scoring::aggregate::total_score(&competition, &red));
    assert_eq!(12, scoring::aggregate::total_score(&competition, &blue));
    assert_eq!(Some(&competition), app.competition());
}

#[tokio::test]
async fn typed_garbage_counts_as_zero() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;
    let red = team(&app, 0);

    app.adjust_score(&red, 8).await.unwrap();
    app.enter_score(&red, "lots").await.unwrap();

    let competition = stored(&store).unwrap();
    assert_eq!(0, scoring::aggregate::total_score(&competition, &red));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn unknown_team_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;
    let before = stored(&store);

    let applied = app
        .adjust_score(&scoring::TeamId::generate(), 5)
        .await
        .unwrap();

    assert!(!applied);
    assert_eq!(before, stored(&store));
    assert!(logs_contain("Ignoring score update for unknown"));
}

#[tokio::test]
async fn finish_only_from_last_round() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;

    assert!(matches!(app.finish().await, Err(AppError::NotLastRound)));
    assert!(!stored(&store).unwrap().finished);

    assert!(app.scoring_mut().unwrap().next_round());
    app.finish().await.unwrap();

    assert!(matches!(app.screen(), Screen::Summary));
    assert!(stored(&store).unwrap().finished);
    assert!(app.summary().unwrap().finished);
}

#[tokio::test]
async fn resume_routes_by_finished_flag() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut app = started(store.clone()).await;
        let red = team(&app, 0);
        app.adjust_score(&red, 3).await.unwrap();
    }

    let mut app = app_with(store.clone()).await;
    assert_eq!(Some("Game Night".to_owned()), app.home_info().map(|i| i.title));
    assert!(app.resume());
    assert!(matches!(app.screen(), Screen::Scoring(_)));

    app.scoring_mut().unwrap().next_round();
    app.finish().await.unwrap();

    let mut app = app_with(store).await;
    assert!(app.resume());
    assert!(matches!(app.screen(), Screen::Summary));
}

#[tokio::test]
async fn nothing_to_resume() {
    let mut app = app_with(Arc::new(MemoryStore::new())).await;

    assert!(!app.resume());
    assert!(matches!(app.screen(), Screen::Home));
}

#[tokio::test]
async fn discard_needs_confirmation() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;

    let request = app.request_discard().unwrap();
    assert_eq!("Game Night", request.title());
    // An unconfirmed request leaves everything in place
    drop(request);
    assert!(stored(&store).is_some());

    let request = app.request_discard().unwrap();
    app.discard(request.confirm()).await.unwrap();

    assert_eq!(None, app.competition());
    assert_eq!(None, stored(&store));
    assert!(matches!(app.screen(), Screen::Home));
    assert!(app.request_discard().is_none());
}

#[tokio::test]
async fn theme_toggle_is_remembered() {
    let store = Arc::new(MemoryStore::new());
    let mut app = app_with(store.clone()).await;

    assert_eq!(common::Theme::Dark, app.toggle_theme().await.unwrap());

    let app = app_with(store).await;
    assert_eq!(common::Theme::Dark, app.theme());
}

#[tokio::test]
async fn mini_game_merges_into_its_round() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;
    let red = team(&app, 0);
    let blue = team(&app, 1);
    let green = team(&app, 2);

    app.adjust_score(&red, 10).await.unwrap();
    assert!(app.open_mini_game());
    assert!(!app.open_mini_game());

    let screen = app.scoring_mut().unwrap();
    assert_eq!(Some(3), screen.update_tally(&red, 3));
    assert_eq!(Some(1), screen.update_tally(&blue, 1));
    assert_eq!(Some(0), screen.update_tally(&green, -4));
    // Moving on does not change which round receives the tallies
    screen.next_round();

    assert!(app.finalize_mini_game().await.unwrap());

    let competition = stored(&store).unwrap();
    let first = &competition.rounds[0];
    let second = &competition.rounds[1];
    assert_eq!(13, first.score(&red));
    assert_eq!(1, first.score(&blue));
    assert_eq!(0, first.score(&green));
    assert_eq!(0, second.score(&red));
    assert!(app.scoring().unwrap().mini_game().is_none());
}

#[tokio::test]
async fn closed_mini_game_keeps_scores() {
    let store = Arc::new(MemoryStore::new());
    let mut app = started(store.clone()).await;
    let red = team(&app, 0);
    let before = stored(&store);

    app.open_mini_game();
    let screen = app.scoring_mut().unwrap();
    screen.update_tally(&red, 7);
    assert!(screen.close_mini_game());

    assert!(!app.finalize_mini_game().await.unwrap());
    assert_eq!(before, stored(&store));
}
