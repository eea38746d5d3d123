//! Delayed effects keyed to simulation time
//!
//! Nothing blocks: a delay is an entry with a due time and the scene epoch it
//! was scheduled in. Entries from an older epoch are dropped when they come due.

use serde::{Deserialize, Serialize};

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Swap in a new balloon, if `instance` is still the popped one
    ReplaceBalloon { instance: u32 },
    /// Remove a gust cone from the screen
    HideGust { id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub due_ms: f64,
    pub epoch: u64,
    pub action: TimerAction,
}

/// Pending timers, fired in due order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<Timer>,
}

impl Timers {
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f32, epoch: u64, action: TimerAction) {
        self.pending.push(Timer {
            due_ms: now_ms + delay_ms.max(0.0) as f64,
            epoch,
            action,
        });
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Timer> {
        let mut due: Vec<Timer> = Vec::new();
        self.pending.retain(|t| {
            if t.due_ms <= now_ms {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.pending.iter().any(|t| t.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_in_order() {
        let mut timers = Timers::default();
        timers.schedule(0.0, 500.0, 1, TimerAction::HideGust { id: 2 });
        timers.schedule(0.0, 100.0, 1, TimerAction::HideGust { id: 1 });
        timers.schedule(0.0, 2500.0, 1, TimerAction::ReplaceBalloon { instance: 1 });

        assert!(timers.take_due(50.0).is_empty());
        let due = timers.take_due(600.0);
        let ids: Vec<_> = due.iter().map(|t| t.action).collect();
        assert_eq!(
            ids,
            vec![TimerAction::HideGust { id: 1 }, TimerAction::HideGust { id: 2 }]
        );
        assert_eq!(timers.len(), 1);
        assert!(timers.is_pending(TimerAction::ReplaceBalloon { instance: 1 }));
    }

    #[test]
    fn test_clear_cancels() {
        let mut timers = Timers::default();
        timers.schedule(0.0, 10.0, 1, TimerAction::HideGust { id: 1 });
        timers.clear();
        assert!(timers.take_due(1000.0).is_empty());
        assert!(timers.is_empty());
    }
}
