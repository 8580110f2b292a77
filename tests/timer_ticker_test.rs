//! Integration test: live timer display driven by the session's state channel

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use knight_moves::{
    KnightRules, ManualClock, PuzzleLayout, PuzzleSession, PuzzleState, Square, TimerTicker,
};
use std::time::Duration;
use tokio::sync::watch;

const TICK: Duration = Duration::from_millis(100);

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

async fn wait_for(rx: &mut watch::Receiver<String>, expected: &str) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|text| text == expected))
        .await
        .expect("display did not update in time")
        .expect("ticker stopped");
}

#[tokio::test(start_paused = true)]
async fn test_not_started_shows_nothing() {
    let clock = ManualClock::new(t0());
    let session = PuzzleSession::new(PuzzleLayout::classic(), KnightRules, clock.clone());
    let ticker = TimerTicker::spawn(session.subscribe(), clock.clone(), TICK);

    clock.advance(ChronoDuration::minutes(3));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(ticker.display(), "");
}

#[tokio::test(start_paused = true)]
async fn test_running_clock_ticks_and_reset_clears_it() {
    let clock = ManualClock::new(t0());
    let mut session = PuzzleSession::new(PuzzleLayout::classic(), KnightRules, clock.clone());
    let ticker = TimerTicker::spawn(session.subscribe(), clock.clone(), TICK);
    let mut display = ticker.subscribe();

    session.attempt_move(Square::parse("g6").unwrap());
    wait_for(&mut display, "0:00").await;

    clock.advance(ChronoDuration::milliseconds(65_000));
    wait_for(&mut display, "1:05").await;

    clock.advance(ChronoDuration::seconds(1));
    wait_for(&mut display, "1:06").await;

    session.reset();
    wait_for(&mut display, "").await;
}

#[tokio::test(start_paused = true)]
async fn test_solved_state_is_frozen() {
    let layout = PuzzleLayout::classic();
    let mut state = PuzzleState::initial(&layout);
    state.next_target_index = layout.targets().len();
    state.start_time = Some(t0());
    state.stop_time = Some(t0() + ChronoDuration::milliseconds(3_725_000));
    let (_tx, rx) = watch::channel(state);

    let clock = ManualClock::new(t0() + ChronoDuration::hours(9));
    let ticker = TimerTicker::spawn(rx, clock.clone(), TICK);
    assert_eq!(ticker.display(), "1:02:05");

    clock.advance(ChronoDuration::hours(1));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(ticker.display(), "1:02:05");
}

#[tokio::test(start_paused = true)]
async fn test_ticker_ends_with_the_session() {
    let clock = ManualClock::new(t0());
    let mut session = PuzzleSession::new(PuzzleLayout::classic(), KnightRules, clock.clone());
    session.attempt_move(Square::parse("g6").unwrap());
    let ticker = TimerTicker::spawn(session.subscribe(), clock, TICK);

    drop(session);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(ticker.is_finished());
}
