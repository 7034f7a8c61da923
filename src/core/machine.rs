//! Machine - Raw run timer for a single cloud machine

use chrono::{DateTime, Duration, Utc};

/// A single cloud machine: a name and the instant its current run started.
///
/// `started_at` is present exactly while the machine is running. The
/// start/stop idempotence guard lives in the owning [`BilledMachine`]; this
/// type only keeps the clock.
///
/// [`BilledMachine`]: super::billing::BilledMachine
#[derive(Debug, Clone)]
pub struct Machine {
    /// Display name, unique within a registry
    name: String,
    /// When the current run started, if running
    started_at: Option<DateTime<Utc>>,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record the current time as the start of a run
    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    /// Record `now` as the start of a run
    pub fn start_at(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
    }

    /// Clear the run start instant
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    /// Elapsed time of the current run, or zero if not running
    pub fn run_duration(&self) -> Duration {
        self.run_duration_at(Utc::now())
    }

    /// Elapsed time of the current run as of `now`, or zero if not running.
    /// Clamped at zero if the clock moved backwards.
    pub fn run_duration_at(&self, now: DateTime<Utc>) -> Duration {
        match self.started_at {
            Some(started) => (now - started).max(Duration::zero()),
            None => Duration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn run_duration_is_zero_when_never_started() {
        let machine = Machine::new("m1");
        assert_eq!(machine.run_duration_at(at(0)), Duration::zero());
    }

    #[test]
    fn run_duration_measures_from_start_instant() {
        let mut machine = Machine::new("m1");
        machine.start_at(at(0));
        assert_eq!(machine.run_duration_at(at(90)), Duration::seconds(90));
    }

    #[test]
    fn stop_clears_the_start_instant() {
        let mut machine = Machine::new("m1");
        machine.start_at(at(0));
        machine.stop();
        assert_eq!(machine.run_duration_at(at(90)), Duration::zero());
    }

    #[test]
    fn run_duration_clamps_clock_skew_to_zero() {
        let mut machine = Machine::new("m1");
        machine.start_at(at(100));
        assert_eq!(machine.run_duration_at(at(40)), Duration::zero());
    }

    #[test]
    fn restart_replaces_the_start_instant() {
        let mut machine = Machine::new("m1");
        machine.start_at(at(0));
        machine.start_at(at(60));
        assert_eq!(machine.run_duration_at(at(90)), Duration::seconds(30));
    }
}
