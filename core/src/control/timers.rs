use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerId {
    /// Periodic sweep cadence.
    Sweep,
    /// One-shot laser hold after activation.
    LaserHold,
    /// Periodic calibration sampling.
    Calibration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start {
        id: TimerId,
        delay: Duration,
        periodic: bool,
    },
    Cancel(TimerId),
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    deadline: Instant,
    period: Option<Duration>,
}

/// Deadline table for the control loop's timers.
///
/// The clock is always passed in, so the schedule can be driven from tests
/// without sleeping.
#[derive(Debug, Default)]
pub struct TimerSchedule {
    armed: BTreeMap<TimerId, Armed>,
}

impl TimerSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: TimerCommand, now: Instant) {
        match command {
            TimerCommand::Start {
                id,
                delay,
                periodic,
            } => self.start(id, now, delay, periodic),
            TimerCommand::Cancel(id) => {
                self.cancel(id);
            }
        }
    }

    /// Arms `id`, replacing any previous deadline.
    pub fn start(&mut self, id: TimerId, now: Instant, delay: Duration, periodic: bool) {
        self.armed.insert(
            id,
            Armed {
                deadline: now + delay,
                period: periodic.then_some(delay),
            },
        );
    }

    /// Idempotent; returns whether the timer was armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.armed.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.armed.clear();
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.values().map(|armed| armed.deadline).min()
    }

    /// Removes and returns the timers due at `now`, earliest first.
    /// Periodic timers are re-armed one period later; a timer that has fallen
    /// behind fires once and is re-armed relative to `now`.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(Instant, TimerId)> = self
            .armed
            .iter()
            .filter(|(_, armed)| armed.deadline <= now)
            .map(|(id, armed)| (armed.deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            let Some(armed) = self.armed.get_mut(id) else {
                continue;
            };
            match armed.period {
                Some(period) if !period.is_zero() => {
                    let next = armed.deadline + period;
                    armed.deadline = if next <= now { now + period } else { next };
                }
                _ => {
                    self.armed.remove(id);
                }
            }
        }

        due.into_iter().map(|(_, id)| id).collect()
    }
}
