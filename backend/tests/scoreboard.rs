use std::time::Duration;

use backend::scoreboard::{ScoringScreen, TimerSettings};
use backend::ticker::{self, TimerSlot};
use pretty_assertions::assert_eq;
use scoring::TeamSpec;

fn competition() -> scoring::Competition {
    scoring::create_competition(
        "Board",
        ["A", "B", "C"]
            .into_iter()
            .map(|name| TeamSpec {
                name: name.to_owned(),
                ..Default::default()
            })
            .collect(),
        vec!["One", "Two"],
    )
    .unwrap()
}

const SHORT: TimerSettings = TimerSettings {
    round: 3,
    mini_game: 2,
};

#[tokio::test]
async fn round_navigation_stays_in_bounds() {
    let c = competition();
    let (tx, _rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    assert_eq!(0, screen.round_index());
    assert!(!screen.previous_round());
    assert!(!screen.can_finish());

    assert!(screen.next_round());
    assert!(!screen.next_round());
    assert_eq!(1, screen.round_index());
    assert_eq!(Some(&c.rounds[1]), screen.current_round(&c));
    assert!(screen.can_finish());
}

#[tokio::test]
async fn display_order_is_cosmetic() {
    let c = competition();
    let (tx, _rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);
    let (a, b, cc) = (c.teams[0].id, c.teams[1].id, c.teams[2].id);

    assert!(!screen.move_up(&a));
    assert!(screen.move_down(&a));
    assert!(!screen.move_down(&scoring::TeamId::generate()));

    let shown: Vec<_> = screen.display_teams(&c).iter().map(|t| t.id).collect();
    assert_eq!(vec![b, a, cc], shown);

    let mutated = screen.adjust(&c, &a, 2).into_inner();
    let order: Vec<_> = mutated.teams.iter().map(|t| t.id).collect();
    assert_eq!(vec![a, b, cc], order);
}

#[tokio::test]
async fn live_totals_sorted_highest_first() {
    let c = competition();
    let (tx, _rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);
    let (a, b) = (c.teams[0].id, c.teams[1].id);

    let c = screen.adjust(&c, &a, 1).into_inner();
    screen.next_round();
    let c = screen.enter(&c, &b, " 4 ").into_inner();
    let c = screen.enter(&c, &a, "0.5").into_inner();

    let totals: Vec<_> = screen
        .live_totals(&c)
        .into_iter()
        .map(|t| (t.name, t.total))
        .collect();
    assert_eq!(
        vec![("B".to_owned(), 4), ("A".to_owned(), 1), ("C".to_owned(), 0)],
        totals
    );
}

async fn next_tick(rx: &mut ticker::TickReceiver) -> ticker::Tick {
    rx.recv().await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn running_timer_ticks_until_expired() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    assert!(screen.start_timer(TimerSlot::Round));
    assert!(screen.is_ticking(TimerSlot::Round));

    let tick = next_tick(&mut rx).await;
    assert_eq!(TimerSlot::Round, tick.slot);
    assert!(!screen.on_tick(tick));
    let tick = next_tick(&mut rx).await;
    assert!(!screen.on_tick(tick));
    let tick = next_tick(&mut rx).await;
    assert!(screen.on_tick(tick));

    let timer = screen.timer(TimerSlot::Round).unwrap();
    assert!(timer.is_expired());
    assert_eq!(0, timer.remaining());
    assert!(!screen.is_ticking(TimerSlot::Round));

    let more = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(more.is_err());
}

#[tokio::test(start_paused = true)]
async fn paused_timer_stops_ticking() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    screen.start_timer(TimerSlot::Round);
    let tick = next_tick(&mut rx).await;
    screen.on_tick(tick);

    assert!(screen.pause_timer(TimerSlot::Round));
    assert!(!screen.is_ticking(TimerSlot::Round));

    let more = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(more.is_err());
    assert_eq!(2, screen.timer(TimerSlot::Round).unwrap().remaining());

    // Ticks of an earlier run do not count for a paused timer
    assert!(!screen.on_tick(tick));
    assert_eq!(2, screen.timer(TimerSlot::Round).unwrap().remaining());
}

#[tokio::test(start_paused = true)]
#[tracing_test::traced_test]
async fn queued_tick_does_not_count_after_restart() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    screen.start_timer(TimerSlot::Round);
    // One second passes, but the tick is still waiting to be handled
    let queued = next_tick(&mut rx).await;

    assert!(screen.pause_timer(TimerSlot::Round));
    assert!(screen.start_timer(TimerSlot::Round));

    assert!(!screen.on_tick(queued));
    assert_eq!(3, screen.timer(TimerSlot::Round).unwrap().remaining());
    assert!(logs_contain("Ignoring stale tick"));

    let fresh = next_tick(&mut rx).await;
    assert_ne!(queued.generation, fresh.generation);
    screen.on_tick(fresh);
    assert_eq!(2, screen.timer(TimerSlot::Round).unwrap().remaining());
}

#[tokio::test(start_paused = true)]
async fn queued_tick_does_not_reach_reopened_mini_game() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    screen.open_mini_game(&c);
    screen.start_timer(TimerSlot::MiniGame);
    let queued = next_tick(&mut rx).await;
    assert_eq!(TimerSlot::MiniGame, queued.slot);

    screen.close_mini_game();
    screen.open_mini_game(&c);
    screen.start_timer(TimerSlot::MiniGame);

    assert!(!screen.on_tick(queued));
    assert_eq!(2, screen.timer(TimerSlot::MiniGame).unwrap().remaining());
}

#[tokio::test(start_paused = true)]
async fn reset_restores_configured_duration() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    screen.start_timer(TimerSlot::Round);
    let tick = next_tick(&mut rx).await;
    screen.on_tick(tick);

    screen.reset_timer(TimerSlot::Round, None);
    let timer = screen.timer(TimerSlot::Round).unwrap();
    assert_eq!(3, timer.remaining());
    assert!(!timer.is_running());
    assert!(!screen.is_ticking(TimerSlot::Round));

    screen.reset_timer(TimerSlot::Round, Some(90));
    assert_eq!(90, screen.timer(TimerSlot::Round).unwrap().remaining());

    screen.adjust_timer(TimerSlot::Round, -100);
    assert_eq!(0, screen.timer(TimerSlot::Round).unwrap().remaining());
}

#[tokio::test(start_paused = true)]
async fn mini_game_timer_needs_open_session() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    assert!(!screen.start_timer(TimerSlot::MiniGame));
    assert_eq!(None, screen.timer(TimerSlot::MiniGame));

    assert!(screen.open_mini_game(&c));
    assert_eq!(2, screen.timer(TimerSlot::MiniGame).unwrap().remaining());
    assert!(screen.start_timer(TimerSlot::MiniGame));
    assert_eq!(TimerSlot::MiniGame, next_tick(&mut rx).await.slot);

    assert!(screen.close_mini_game());
    assert!(!screen.is_ticking(TimerSlot::MiniGame));
    let more = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(more.is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_screen_stops_tickers() {
    let c = competition();
    let (tx, mut rx) = ticker::channel();
    let mut screen = ScoringScreen::new(&c, SHORT, tx);

    screen.start_timer(TimerSlot::Round);
    drop(screen);

    assert_eq!(None, rx.recv().await);
}
