use crate::Timestamp;

/// Seconds spent on the local player's current turn. Display only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnTimer {
    started_at: Option<Timestamp>,
    stopped_secs: u32,
}

impl TurnTimer {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn restart(&mut self, now: Timestamp) {
        self.started_at = Some(now);
        self.stopped_secs = 0;
    }

    /// Freezes the counter at its current value.
    pub fn stop(&mut self, now: Timestamp) {
        self.stopped_secs = self.elapsed_secs(now);
        self.started_at = None;
    }

    /// Back to zero; a running timer keeps counting from here.
    pub fn reset(&mut self, now: Timestamp) {
        self.stopped_secs = 0;
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    pub fn elapsed_secs(&self, now: Timestamp) -> u32 {
        match self.started_at {
            Some(started_at) => (now - started_at).num_seconds().max(0) as u32,
            None => self.stopped_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};

    fn t0() -> Timestamp {
        DateTime::from_timestamp_millis(0).unwrap()
    }

    fn secs(n: i64) -> Timestamp {
        t0() + TimeDelta::milliseconds(n * 1000)
    }

    #[test]
    fn counts_whole_seconds_while_running() {
        let mut timer = TurnTimer::default();
        timer.restart(t0());

        assert_eq!(timer.elapsed_secs(t0()), 0);
        assert_eq!(timer.elapsed_secs(t0() + TimeDelta::milliseconds(999)), 0);
        assert_eq!(timer.elapsed_secs(secs(1)), 1);
        assert_eq!(timer.elapsed_secs(secs(42)), 42);
    }

    #[test]
    fn stop_freezes_and_restart_zeroes() {
        let mut timer = TurnTimer::default();
        timer.restart(t0());
        timer.stop(secs(5));

        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_secs(secs(60)), 5);

        timer.restart(secs(60));
        assert_eq!(timer.elapsed_secs(secs(61)), 1);
    }

    #[test]
    fn reset_keeps_running_state() {
        let mut timer = TurnTimer::default();
        timer.restart(t0());
        timer.reset(secs(7));
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_secs(secs(9)), 2);

        timer.stop(secs(9));
        timer.reset(secs(10));
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_secs(secs(20)), 0);
    }

    #[test]
    fn clock_going_backwards_reads_zero() {
        let mut timer = TurnTimer::default();
        timer.restart(secs(10));

        assert_eq!(timer.elapsed_secs(secs(3)), 0);
    }
}
