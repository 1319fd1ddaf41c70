use bevy::{ecs::system::SystemParam, prelude::*};
use rush_runtime::TaskId;
use tracing::{debug, info};

use crate::{
    board::{secs_to_ms, BoardTask, ClickOutcome, TaskBoard},
    config::GameConfigHandle,
    events::{BoardRemoval, GameEvent, PlayerCommand, QueueRemoval},
    ledger::{Ledger, LedgerTransition},
    queue::{QueuedTask, TaskQueue},
    resources::{GameClock, SessionRng, TaskIdAllocator},
    scheduler::{TimerPurpose, TimerSchedule},
    session::{DayOutcome, DaySession, GameOverReason, SessionPhase},
    spawner,
};

/// Every piece of mutable session state, borrowed together so each
/// transition below updates collections, timers and the ledger in one step.
#[derive(SystemParam)]
pub struct SessionParams<'w> {
    pub config: Res<'w, GameConfigHandle>,
    pub clock: ResMut<'w, GameClock>,
    pub session: ResMut<'w, DaySession>,
    pub board: ResMut<'w, TaskBoard>,
    pub queue: ResMut<'w, TaskQueue>,
    pub ledger: ResMut<'w, Ledger>,
    pub timers: ResMut<'w, TimerSchedule>,
    pub events: EventWriter<'w, GameEvent>,
}

impl<'w> SessionParams<'w> {
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Pause => {
                if !self.session.is_over() && !self.session.paused {
                    self.session.paused = true;
                    self.events.send(GameEvent::Paused);
                    info!(target: "order_rush::session", day = self.session.current_day, "session.paused");
                }
            }
            PlayerCommand::Resume => {
                if self.session.paused {
                    self.session.paused = false;
                    self.events.send(GameEvent::Resumed);
                    info!(target: "order_rush::session", day = self.session.current_day, "session.resumed");
                }
            }
            PlayerCommand::AdvanceDay => {
                if self.session.paused {
                    debug!(target: "order_rush::session", "advance_day.ignored=paused");
                } else if matches!(self.session.phase, SessionPhase::DayComplete { .. }) {
                    self.conclude_day();
                }
            }
            PlayerCommand::QuitToMenu => self.end_session(GameOverReason::Quit),
            PlayerCommand::Restart => {
                if self.session.is_over() {
                    self.restart();
                }
            }
            PlayerCommand::Click(id) | PlayerCommand::Open(id) | PlayerCommand::Resolve { task: id, .. }
                if !self.session.is_live() =>
            {
                debug!(target: "order_rush::session", task = %id, "command.ignored=not_live");
            }
            PlayerCommand::Click(id) => self.click(id),
            PlayerCommand::Open(id) => self.open(id),
            PlayerCommand::Resolve { task, success } => self.resolve(task, success, false),
        }
    }

    fn click(&mut self, id: TaskId) {
        if self.board.contains(id) {
            match self.board.click(id) {
                Some(ClickOutcome::Counted {
                    clicks,
                    clicks_required,
                }) => {
                    self.events.send(GameEvent::BoardTaskClicked {
                        id,
                        clicks,
                        clicks_required,
                    });
                }
                Some(ClickOutcome::Completed(task)) => {
                    self.timers.cancel(id, TimerPurpose::BoardExpiry);
                    self.events.send(GameEvent::BoardTaskClicked {
                        id,
                        clicks: task.clicks,
                        clicks_required: task.clicks_required,
                    });
                    self.events.send(GameEvent::BoardTaskRemoved {
                        id,
                        category: task.category,
                        reason: BoardRemoval::Clicked,
                    });
                    self.enqueue(&task);
                }
                None => {}
            }
        } else if self.queue.contains(id) {
            self.open(id);
        } else {
            debug!(target: "order_rush::board", task = %id, "click.ignored=unknown_task");
        }
    }

    fn enqueue(&mut self, task: &BoardTask) {
        let config = self.config.get();
        let queued = QueuedTask::new(
            task.id,
            task.category,
            config.queue.time_limit_secs,
            self.clock.now_ms(),
        );
        let expires_at = queued.expires_at_ms();
        match self.queue.enqueue(queued) {
            Ok(()) => {
                self.timers
                    .schedule(task.id, TimerPurpose::QueueExpiry, expires_at);
                self.events.send(GameEvent::TaskQueued {
                    id: task.id,
                    category: task.category,
                    time_limit_secs: config.queue.time_limit_secs,
                });
                debug!(
                    target: "order_rush::queue",
                    task = %task.id,
                    category = %task.category,
                    queued = self.queue.len(),
                    "task.queued"
                );
            }
            Err(err) => {
                debug!(target: "order_rush::queue", error = %err, "enqueue.rejected");
            }
        }
    }

    fn open(&mut self, id: TaskId) {
        let category = match self.queue.open(id) {
            Ok(task) => task.category,
            Err(err) => {
                debug!(target: "order_rush::queue", error = %err, "open.rejected");
                return;
            }
        };
        let limit_secs = self.config.get().queue.resolution_time_limit_secs;
        self.timers.schedule(
            id,
            TimerPurpose::ResolutionExpiry,
            self.clock.now_ms() + secs_to_ms(limit_secs),
        );
        self.events.send(GameEvent::ResolutionOpened {
            id,
            kind: category.resolution(),
            time_limit_secs: limit_secs,
        });
    }

    fn resolve(&mut self, id: TaskId, success: bool, forced: bool) {
        let task = match self.queue.resolve(id) {
            Ok(task) => task,
            Err(err) => {
                debug!(target: "order_rush::queue", error = %err, "resolve.rejected");
                return;
            }
        };
        self.timers.cancel_task(id);
        self.events.send(GameEvent::ResolutionClosed {
            id,
            success,
            forced,
        });
        self.events.send(GameEvent::QueueTaskRemoved {
            id,
            category: task.category,
            reason: if success {
                QueueRemoval::Resolved
            } else {
                QueueRemoval::Failed
            },
        });
        self.record(if success {
            LedgerTransition::ResolutionSucceeded
        } else {
            LedgerTransition::ResolutionFailed
        });
    }

    fn expire(&mut self, id: TaskId, purpose: TimerPurpose) {
        match purpose {
            TimerPurpose::BoardExpiry => {
                let Some(task) = self.board.remove(id) else {
                    return;
                };
                self.events.send(GameEvent::BoardTaskRemoved {
                    id,
                    category: task.category,
                    reason: BoardRemoval::TimedOut,
                });
                self.record(LedgerTransition::BoardTimeout {
                    tier: task.category.timeout_penalty(),
                });
            }
            TimerPurpose::QueueExpiry => {
                let Some((task, was_open)) = self.queue.remove(id) else {
                    return;
                };
                self.timers.cancel_task(id);
                if was_open {
                    self.events.send(GameEvent::ResolutionClosed {
                        id,
                        success: false,
                        forced: true,
                    });
                }
                self.events.send(GameEvent::QueueTaskRemoved {
                    id,
                    category: task.category,
                    reason: QueueRemoval::TimedOut,
                });
                self.record(LedgerTransition::QueueTimeout);
            }
            TimerPurpose::ResolutionExpiry => {
                if self.queue.open_task() == Some(id) {
                    self.resolve(id, false, true);
                }
            }
        }
    }

    fn record(&mut self, transition: LedgerTransition) {
        let config = self.config.get();
        let Some(change) = self.ledger.apply(transition, &config.ledger) else {
            return;
        };
        self.events.send(GameEvent::LedgerChanged {
            transition,
            score: change.score,
            stress: change.stress,
            score_delta: change.score_delta,
            stress_delta: change.stress_delta,
        });
        debug!(
            target: "order_rush::ledger",
            score = change.score,
            stress = change.stress,
            "ledger.changed"
        );
        if change.saturated {
            self.end_session(GameOverReason::StressMaxed);
        }
    }

    fn place_task(&mut self, task: BoardTask) {
        let id = task.id;
        let expires_at = task.expires_at_ms();
        if !self.board.insert(task.clone()) {
            return;
        }
        self.timers
            .schedule(id, TimerPurpose::BoardExpiry, expires_at);
        debug!(
            target: "order_rush::board",
            task = %id,
            category = %task.category,
            urgent = task.urgent,
            time_limit = task.time_limit_secs,
            "task.spawned"
        );
        self.events.send(GameEvent::TaskSpawned { task });
    }

    fn clear_board(&mut self) {
        self.timers.cancel_purpose(TimerPurpose::BoardExpiry);
        for task in self.board.clear() {
            self.events.send(GameEvent::BoardTaskRemoved {
                id: task.id,
                category: task.category,
                reason: BoardRemoval::Cleared,
            });
        }
    }

    fn clear_queue(&mut self) {
        if let Some(open) = self.queue.open_task() {
            self.events.send(GameEvent::ResolutionClosed {
                id: open,
                success: false,
                forced: true,
            });
        }
        for task in self.queue.clear() {
            self.timers.cancel_task(task.id);
            self.events.send(GameEvent::QueueTaskRemoved {
                id: task.id,
                category: task.category,
                reason: QueueRemoval::Cleared,
            });
        }
    }

    fn complete_day(&mut self) {
        let config = self.config.get();
        self.clear_board();
        self.session.chaos_mode = false;
        self.session.day_score_snapshot = self.ledger.score();
        let outcome = self.session.outcome_for(&config.session);
        self.session.phase = SessionPhase::DayComplete {
            outcome,
            remaining_ms: DaySession::delay_for(outcome, &config.session),
        };
        info!(
            target: "order_rush::session",
            day = self.session.current_day,
            day_score = self.session.day_score_snapshot,
            stress = self.ledger.stress(),
            "day.completed"
        );
        self.events.send(GameEvent::DayCompleted {
            day: self.session.current_day,
            day_score: self.session.day_score_snapshot,
            outcome,
        });
    }

    fn conclude_day(&mut self) {
        let SessionPhase::DayComplete { outcome, .. } = self.session.phase else {
            return;
        };
        match outcome {
            DayOutcome::NextDay => self.start_next_day(),
            DayOutcome::GameOver(reason) => self.end_session(reason),
        }
    }

    fn start_next_day(&mut self) {
        self.clear_board();
        self.clear_queue();
        self.session.current_day += 1;
        self.session.reset_day_clock();
        self.session.phase = SessionPhase::Running;
        info!(target: "order_rush::session", day = self.session.current_day, "day.started");
        self.events.send(GameEvent::DayStarted {
            day: self.session.current_day,
        });
    }

    /// Tears the session down. Idempotent: only the first call reports.
    fn end_session(&mut self, reason: GameOverReason) {
        if self.session.is_over() {
            return;
        }
        self.clear_board();
        self.clear_queue();
        self.timers.clear();
        self.ledger.lock();
        self.session.paused = false;
        self.session.chaos_mode = false;
        self.session.phase = SessionPhase::GameOver { reason };
        let final_score = self.ledger.score();
        info!(
            target: "order_rush::session",
            reason = reason.as_str(),
            final_score,
            day = self.session.current_day,
            "session.game_over"
        );
        self.events.send(GameEvent::GameOver {
            final_score,
            reason,
        });
    }

    fn restart(&mut self) {
        self.timers.clear();
        self.board.clear();
        self.queue.clear();
        *self.ledger = Ledger::default();
        *self.session = DaySession::default();
        info!(target: "order_rush::session", "session.restarted");
        self.events.send(GameEvent::DayStarted { day: 1 });
    }
}

/// Applies queued player input. Runs first so a resolution submitted in
/// the same tick as its timeout wins.
pub fn apply_player_commands(
    mut commands: EventReader<PlayerCommand>,
    mut params: SessionParams,
) {
    for command in commands.read() {
        params.handle_command(*command);
    }
}

/// Counts down the day-complete screen and applies its outcome.
pub fn advance_day_phase(mut params: SessionParams) {
    if params.session.paused {
        return;
    }
    let SessionPhase::DayComplete {
        outcome,
        remaining_ms,
    } = params.session.phase
    else {
        return;
    };
    let step = params.config.get().clock.tick_ms;
    let left = remaining_ms.saturating_sub(step);
    if left == 0 {
        params.conclude_day();
    } else {
        params.session.phase = SessionPhase::DayComplete {
            outcome,
            remaining_ms: left,
        };
    }
}

/// Moves gameplay time forward one step and emits whole-second day ticks.
pub fn advance_clock(mut params: SessionParams) {
    if !params.session.is_live() {
        return;
    }
    let config = params.config.get();
    let step = config.clock.tick_ms;
    params.clock.advance(step);
    params.session.day_elapsed_ms += step;

    let elapsed_secs = (params.session.day_elapsed_ms / config.clock.day_tick_ms) as u32;
    let chaos_at = config.session.chaos_starts_at_secs();
    while params.session.day_elapsed_secs < elapsed_secs {
        params.session.day_elapsed_secs += 1;
        let day = params.session.current_day;
        let elapsed = params.session.day_elapsed_secs;
        params.events.send(GameEvent::DayTick {
            day,
            elapsed_secs: elapsed,
        });
        if !params.session.chaos_mode && elapsed >= chaos_at {
            params.session.chaos_mode = true;
            info!(target: "order_rush::session", day, elapsed, "chaos.activated");
            params.events.send(GameEvent::ChaosModeActivated { day });
        }
    }
}

/// Fires due board, queue and resolution timers.
pub fn expire_timers(mut params: SessionParams) {
    if !params.session.is_live() {
        return;
    }
    let now = params.clock.now_ms();
    for key in params.timers.drain_expired(now) {
        if !params.session.is_running() {
            break;
        }
        params.expire(key.task, key.purpose);
    }
}

pub fn end_day_when_elapsed(mut params: SessionParams) {
    let config = params.config.get();
    if params.session.is_live() && params.session.day_finished(&config.session) {
        params.complete_day();
    }
}

pub fn spawn_tasks(
    mut params: SessionParams,
    mut rng: ResMut<SessionRng>,
    mut ids: ResMut<TaskIdAllocator>,
) {
    if !params.session.is_live() {
        return;
    }
    let config = params.config.get();
    let elapsed = params.session.day_elapsed_secs;
    let chaos = params.session.chaos_mode;
    if !spawner::should_spawn(&mut rng.0, &config.spawn, elapsed, chaos) {
        return;
    }
    let task = spawner::roll_task(
        &mut rng.0,
        &config.spawn,
        ids.allocate(),
        params.clock.now_ms(),
        chaos,
    );
    params.place_task(task);
}

/// Places a task of the given kind at the centre of the board, outside the
/// random spawn roll. Used by tooling and tests that need a known task.
pub fn inject_task(
    world: &mut World,
    category: rush_runtime::TaskCategory,
    time_limit_secs: f32,
) -> TaskId {
    let id = world.resource_mut::<TaskIdAllocator>().allocate();
    let now = world.resource::<GameClock>().now_ms();
    let task = BoardTask::new(
        id,
        category,
        crate::board::TaskPosition { x: 50.0, y: 50.0 },
        time_limit_secs,
        false,
        now,
    );
    let expires_at = task.expires_at_ms();
    if world.resource_mut::<TaskBoard>().insert(task.clone()) {
        world
            .resource_mut::<TimerSchedule>()
            .schedule(id, TimerPurpose::BoardExpiry, expires_at);
        world.send_event(GameEvent::TaskSpawned { task });
    }
    id
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::World;
    use bevy_ecs::system::RunSystemOnce;
    use rush_runtime::TaskCategory;

    use super::*;
    use crate::config::GameConfig;

    fn world_with(config: GameConfig) -> World {
        let mut world = World::default();
        world.insert_resource(SessionRng::from_seed(config.seed));
        world.insert_resource(GameConfigHandle::new(Arc::new(config)));
        world.init_resource::<GameClock>();
        world.init_resource::<TaskIdAllocator>();
        world.init_resource::<TimerSchedule>();
        world.init_resource::<TaskBoard>();
        world.init_resource::<TaskQueue>();
        world.init_resource::<Ledger>();
        world.init_resource::<DaySession>();
        world.init_resource::<Events<GameEvent>>();
        world.init_resource::<Events<PlayerCommand>>();
        world
    }

    fn drain(world: &mut World) -> Vec<GameEvent> {
        world.resource_mut::<Events<GameEvent>>().drain().collect()
    }

    #[test]
    fn elapsed_day_moves_to_day_complete_and_clears_board() {
        let mut world = world_with(GameConfig::builtin());
        let id = inject_task(&mut world, TaskCategory::WrongShipping, 5.0);
        world.resource_mut::<DaySession>().day_elapsed_secs = 90;
        world.resource_mut::<Ledger>().apply(
            LedgerTransition::ResolutionSucceeded,
            &GameConfig::builtin().ledger,
        );

        world.run_system_once(end_day_when_elapsed);

        let session = world.resource::<DaySession>();
        assert_eq!(session.day_score_snapshot, 1);
        assert_eq!(
            session.phase,
            SessionPhase::DayComplete {
                outcome: DayOutcome::NextDay,
                remaining_ms: 3_000,
            }
        );
        assert!(!world.resource::<TaskBoard>().contains(id));
        assert!(world.resource::<TimerSchedule>().is_empty());
        assert!(drain(&mut world).iter().any(|event| matches!(
            event,
            GameEvent::BoardTaskRemoved {
                reason: BoardRemoval::Cleared,
                ..
            }
        )));
    }

    #[test]
    fn day_complete_delay_counts_down_then_starts_next_day() {
        let mut world = world_with(GameConfig::builtin());
        world.resource_mut::<DaySession>().phase = SessionPhase::DayComplete {
            outcome: DayOutcome::NextDay,
            remaining_ms: 200,
        };

        world.run_system_once(advance_day_phase);
        assert_eq!(world.resource::<DaySession>().current_day, 1);

        world.resource_mut::<DaySession>().paused = true;
        world.run_system_once(advance_day_phase);
        assert_eq!(
            world.resource::<DaySession>().phase,
            SessionPhase::DayComplete {
                outcome: DayOutcome::NextDay,
                remaining_ms: 100,
            }
        );

        world.resource_mut::<DaySession>().paused = false;
        world.run_system_once(advance_day_phase);
        let session = world.resource::<DaySession>();
        assert_eq!(session.current_day, 2);
        assert!(session.is_running());
        assert!(drain(&mut world).contains(&GameEvent::DayStarted { day: 2 }));
    }

    #[test]
    fn spawner_places_task_with_armed_timer() {
        let mut config = GameConfig::builtin();
        config.spawn.spawn_threshold = f32::MAX;
        let mut world = world_with(config);

        world.run_system_once(spawn_tasks);

        let board = world.resource::<TaskBoard>();
        assert_eq!(board.len(), 1);
        let task = board.iter().next().cloned().unwrap();
        assert!(world
            .resource::<TimerSchedule>()
            .is_armed(task.id, TimerPurpose::BoardExpiry));
        assert!((15.0..=85.0).contains(&task.position.x));
    }

    #[test]
    fn paused_session_fires_no_timers() {
        let mut world = world_with(GameConfig::builtin());
        let id = inject_task(&mut world, TaskCategory::CouponIssue, 0.1);
        world.resource_mut::<GameClock>().advance(500);
        world.resource_mut::<DaySession>().paused = true;

        world.run_system_once(expire_timers);
        assert!(world.resource::<TaskBoard>().contains(id));

        world.resource_mut::<DaySession>().paused = false;
        world.run_system_once(expire_timers);
        assert!(!world.resource::<TaskBoard>().contains(id));
        assert_eq!(world.resource::<Ledger>().stress(), 15.0);
    }
}
