mod common;

use rush_core::{
    build_app_with_config, inject_task, submit_command, DayOutcome, DaySession, GameClock,
    GameEvent, GameOverReason, Ledger, PlayerCommand, SessionPhase, TaskBoard,
};
use rush_runtime::TaskCategory;

use common::{count, quiet_app, quiet_config, run_ticks};

fn short_day_app(day_secs: u32, max_days: u32) -> bevy::prelude::App {
    let mut config = quiet_config();
    config.session.day_duration_secs = day_secs;
    config.session.max_days = max_days;
    build_app_with_config(config)
}

#[test]
fn negative_day_score_ends_the_session_after_the_delay() {
    let mut app = quiet_app();
    app.world.insert_resource(Ledger::new(-3, 0.0));

    let events = run_ticks(&mut app, 900);
    assert!(events.iter().any(|event| matches!(
        event,
        GameEvent::DayCompleted {
            day: 1,
            day_score: -3,
            outcome: DayOutcome::GameOver(GameOverReason::NegativeDayScore),
        }
    )));
    assert!(!app.world.resource::<DaySession>().is_over());

    // 1400 ms at 100 ms per tick.
    run_ticks(&mut app, 13);
    assert!(!app.world.resource::<DaySession>().is_over());
    let events = run_ticks(&mut app, 1);
    assert_eq!(
        app.world.resource::<DaySession>().game_over_reason(),
        Some(GameOverReason::NegativeDayScore)
    );
    assert!(events.contains(&GameEvent::GameOver {
        final_score: -3,
        reason: GameOverReason::NegativeDayScore,
    }));
}

#[test]
fn last_day_completes_the_session() {
    let mut app = short_day_app(2, 2);
    let events = run_ticks(&mut app, 120);

    assert!(events.contains(&GameEvent::DayStarted { day: 2 }));
    assert!(events.iter().any(|event| matches!(
        event,
        GameEvent::DayCompleted {
            day: 2,
            outcome: DayOutcome::GameOver(GameOverReason::SessionComplete),
            ..
        }
    )));
    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::GameOver { .. })),
        1
    );
    assert_eq!(
        app.world.resource::<DaySession>().game_over_reason(),
        Some(GameOverReason::SessionComplete)
    );
    assert_eq!(app.world.resource::<DaySession>().current_day, 2);
}

#[test]
fn day_end_clears_the_board_and_advance_skips_the_delay() {
    let mut app = short_day_app(2, 5);
    let id = inject_task(&mut app.world, TaskCategory::ReputationDrop, 8.0);

    let events = run_ticks(&mut app, 20);
    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::DayTick { day: 1, .. })),
        2
    );
    assert!(matches!(
        app.world.resource::<DaySession>().phase,
        SessionPhase::DayComplete {
            outcome: DayOutcome::NextDay,
            ..
        }
    ));
    assert!(!app.world.resource::<TaskBoard>().contains(id));
    // Cleared at day end, so no timeout stress.
    assert_eq!(app.world.resource::<Ledger>().stress(), 0.0);

    submit_command(&mut app, PlayerCommand::AdvanceDay);
    let events = run_ticks(&mut app, 1);
    assert!(events.contains(&GameEvent::DayStarted { day: 2 }));
    assert!(app.world.resource::<DaySession>().is_running());
}

#[test]
fn chaos_mode_starts_at_seventy_percent_of_the_day() {
    let mut app = short_day_app(10, 5);

    let events = run_ticks(&mut app, 69);
    assert!(!app.world.resource::<DaySession>().chaos_mode);
    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::ChaosModeActivated { .. })),
        0
    );

    let events = run_ticks(&mut app, 1);
    assert!(app.world.resource::<DaySession>().chaos_mode);
    assert!(events.contains(&GameEvent::ChaosModeActivated { day: 1 }));

    run_ticks(&mut app, 30);
    assert!(!app.world.resource::<DaySession>().chaos_mode);
}

#[test]
fn pause_freezes_every_timer() {
    let mut app = quiet_app();
    let id = inject_task(&mut app.world, TaskCategory::PackageMissing, 1.0);

    submit_command(&mut app, PlayerCommand::Pause);
    let events = run_ticks(&mut app, 50);
    assert!(events.contains(&GameEvent::Paused));
    assert_eq!(app.world.resource::<GameClock>().now_ms(), 0);
    assert_eq!(app.world.resource::<DaySession>().day_elapsed_ms, 0);
    assert!(app.world.resource::<TaskBoard>().contains(id));

    submit_command(&mut app, PlayerCommand::Resume);
    run_ticks(&mut app, 9);
    assert!(app.world.resource::<TaskBoard>().contains(id));
    run_ticks(&mut app, 1);
    assert!(!app.world.resource::<TaskBoard>().contains(id));
    assert_eq!(app.world.resource::<Ledger>().stress(), 15.0);
}

#[test]
fn clicks_are_ignored_while_paused() {
    let mut app = quiet_app();
    let id = inject_task(&mut app.world, TaskCategory::CouponIssue, 4.0);

    submit_command(&mut app, PlayerCommand::Pause);
    submit_command(&mut app, PlayerCommand::Click(id));
    run_ticks(&mut app, 1);
    assert!(app.world.resource::<TaskBoard>().contains(id));
}

#[test]
fn quit_ends_the_session_and_restart_begins_a_new_one() {
    let mut app = quiet_app();
    inject_task(&mut app.world, TaskCategory::ReputationDrop, 1.0);
    run_ticks(&mut app, 10);
    assert_eq!(app.world.resource::<Ledger>().stress(), 25.0);

    submit_command(&mut app, PlayerCommand::QuitToMenu);
    let events = run_ticks(&mut app, 1);
    assert!(events.contains(&GameEvent::GameOver {
        final_score: 0,
        reason: GameOverReason::Quit,
    }));

    // Further play commands are ignored until restart.
    submit_command(&mut app, PlayerCommand::QuitToMenu);
    let events = run_ticks(&mut app, 5);
    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::GameOver { .. })),
        0
    );

    submit_command(&mut app, PlayerCommand::Restart);
    let events = run_ticks(&mut app, 1);
    assert!(events.contains(&GameEvent::DayStarted { day: 1 }));
    let session = app.world.resource::<DaySession>();
    assert!(session.is_running());
    assert_eq!(session.current_day, 1);
    assert_eq!(app.world.resource::<Ledger>().stress(), 0.0);
    assert!(!app.world.resource::<Ledger>().is_locked());
}
