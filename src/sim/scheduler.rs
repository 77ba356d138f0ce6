//! Cooperative task scheduler
//!
//! Every timer the game needs (enemy spawns, fire rates, ability expiry,
//! per-frame ability loops) is a [`Task`] registered here with a
//! [`TaskHandle`]. The session asks for the due tasks once per frame and runs
//! each one to completion before the next.

use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u64);

/// Work a scheduled task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    SpawnEnemy,
    PlayerFire,
    /// Refresh the turret cooldown readout
    CooldownDisplay,
    BlackHoleAttract,
    BlackHoleExpire,
    TurretFire(EntityId),
    TurretChase(EntityId),
    TurretExpire(EntityId),
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::SpawnEnemy => "spawn-enemy",
            Task::PlayerFire => "player-fire",
            Task::CooldownDisplay => "cooldown-display",
            Task::BlackHoleAttract => "black-hole-attract",
            Task::BlackHoleExpire => "black-hole-expire",
            Task::TurretFire(_) => "turret-fire",
            Task::TurretChase(_) => "turret-chase",
            Task::TurretExpire(_) => "turret-expire",
        }
    }
}

/// When a task runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Repeats every `interval_ms`, next run at `next_due`
    Every { interval_ms: u64, next_due: u64 },
    /// Runs once at `due`, then is dropped
    Once { due: u64 },
    /// Runs on every frame until cancelled
    EveryFrame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    schedule: Schedule,
}

/// Registry of pending tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, task: Task, schedule: Schedule) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        log::trace!("Scheduled {} as {:?} ({:?})", task.name(), handle, schedule);
        self.entries.push(Entry {
            handle,
            task,
            schedule,
        });
        handle
    }

    /// Run `task` every `interval_ms`, first at `now + interval_ms`
    pub fn every(&mut self, task: Task, interval_ms: u64, now: u64) -> TaskHandle {
        self.register(
            task,
            Schedule::Every {
                interval_ms,
                next_due: now.saturating_add(interval_ms),
            },
        )
    }

    /// Run `task` once, `delay_ms` from `now`
    pub fn once(&mut self, task: Task, delay_ms: u64, now: u64) -> TaskHandle {
        self.register(
            task,
            Schedule::Once {
                due: now.saturating_add(delay_ms),
            },
        )
    }

    /// Run `task` on every frame
    pub fn every_frame(&mut self, task: Task) -> TaskHandle {
        self.register(task, Schedule::EveryFrame)
    }

    /// Cancel a task. Cancelling an unknown or finished task is a no-op.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        let cancelled = self.entries.len() != before;
        if cancelled {
            log::trace!("Cancelled {:?}", handle);
        }
        cancelled
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect the tasks due at `now`, ordered by due time then registration.
    ///
    /// A recurring task is returned once for every interval boundary passed
    /// since it last ran, so its rate does not depend on frame length.
    /// Every-frame tasks are returned once (sorted as due at `now`).
    /// One-shot tasks are returned once and removed.
    pub fn take_due(&mut self, now: u64) -> Vec<(TaskHandle, Task)> {
        let mut due: Vec<(u64, TaskHandle, Task)> = Vec::new();
        for entry in &mut self.entries {
            match &mut entry.schedule {
                Schedule::Every {
                    interval_ms,
                    next_due,
                } => {
                    let step = (*interval_ms).max(1);
                    while *next_due <= now {
                        due.push((*next_due, entry.handle, entry.task));
                        *next_due = next_due.saturating_add(step);
                    }
                }
                Schedule::Once { due: at } if *at <= now => {
                    due.push((*at, entry.handle, entry.task));
                }
                Schedule::EveryFrame => due.push((now, entry.handle, entry.task)),
                Schedule::Once { .. } => {}
            }
        }
        // Handles are allocated in registration order
        due.sort_by_key(|&(d, handle, _)| (d, handle.0));

        self.entries
            .retain(|e| !matches!(e.schedule, Schedule::Once { due } if due <= now));

        due.into_iter().map(|(_, h, t)| (h, t)).collect()
    }
}
