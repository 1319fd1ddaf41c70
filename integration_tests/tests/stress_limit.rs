mod common;

use rush_core::{inject_task, DaySession, GameEvent, GameOverReason, Ledger, TaskBoard};
use rush_runtime::TaskCategory;

use common::{count, quiet_app, run_ticks};

#[test]
fn maxed_stress_ends_the_session_exactly_once() {
    let mut app = quiet_app();
    for _ in 0..4 {
        inject_task(&mut app.world, TaskCategory::ReputationDrop, 1.0);
    }
    let spare = inject_task(&mut app.world, TaskCategory::CouponIssue, 1.0);

    let mut events = run_ticks(&mut app, 10);
    events.extend(run_ticks(&mut app, 50));

    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::GameOver { .. })),
        1
    );
    assert!(events.contains(&GameEvent::GameOver {
        final_score: 0,
        reason: GameOverReason::StressMaxed,
    }));
    // The fifth timeout never reached the ledger.
    assert_eq!(
        count(&events, |event| matches!(event, GameEvent::LedgerChanged { .. })),
        4
    );
    assert!(!app.world.resource::<TaskBoard>().contains(spare));

    let ledger = app.world.resource::<Ledger>();
    assert_eq!(ledger.stress(), 100.0);
    assert!(ledger.is_locked());
    assert_eq!(
        app.world.resource::<DaySession>().game_over_reason(),
        Some(GameOverReason::StressMaxed)
    );
}

#[test]
fn stress_never_leaves_its_bounds() {
    let mut app = quiet_app();
    for _ in 0..12 {
        inject_task(&mut app.world, TaskCategory::ReputationDrop, 2.0);
    }
    let events = run_ticks(&mut app, 40);
    for event in &events {
        if let GameEvent::LedgerChanged { stress, .. } = event {
            assert!((0.0..=100.0).contains(stress));
        }
    }
}
