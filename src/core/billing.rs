//! Billing - Price plans and per-machine cost accrual

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::machine::Machine;

/// Currency values are reported rounded half-up to cents
const CENTS: u32 = 2;

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero)
}

/// Flat per-minute price plan, fixed at machine creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricePlan {
    OneDollarPerMinute,
    TwoDollarsPerMinute,
}

impl PricePlan {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneDollarPerMinute => "One Dollar Per Minute",
            Self::TwoDollarsPerMinute => "Two Dollars Per Minute",
        }
    }

    pub fn all() -> &'static [PricePlan] {
        &[PricePlan::OneDollarPerMinute, PricePlan::TwoDollarsPerMinute]
    }

    /// Dollars billed per minute of uptime
    pub fn per_minute_rate(&self) -> Decimal {
        match self {
            Self::OneDollarPerMinute => Decimal::ONE,
            Self::TwoDollarsPerMinute => Decimal::TWO,
        }
    }

    /// Map a 1-based menu selection onto a plan
    pub fn from_menu_choice(choice: &str) -> Option<PricePlan> {
        let index: usize = choice.trim().parse().ok()?;
        Self::all().get(index.checked_sub(1)?).copied()
    }
}

/// Status of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    Running,
    Stopped,
}

impl MachineStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

/// Point-in-time snapshot of a machine, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub name: String,
    pub price_plan: String,
    pub status: String,
    pub total_uptime_min: String,
}

/// A machine billed under a price plan.
///
/// Wraps the raw [`Machine`] timer and accumulates billable uptime across
/// start/stop cycles. `accumulated_uptime` holds completed intervals only;
/// it grows exactly once per interval, at the moment the interval ends.
#[derive(Debug, Clone)]
pub struct BilledMachine {
    machine: Machine,
    plan: PricePlan,
    accumulated_uptime: Duration,
    running: bool,
}

impl BilledMachine {
    pub fn new(name: impl Into<String>, plan: PricePlan) -> Self {
        Self {
            machine: Machine::new(name),
            plan,
            accumulated_uptime: Duration::zero(),
            running: false,
        }
    }

    pub fn name(&self) -> &str {
        self.machine.name()
    }

    pub fn plan(&self) -> PricePlan {
        self.plan
    }

    pub fn status(&self) -> MachineStatus {
        if self.running {
            MachineStatus::Running
        } else {
            MachineStatus::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin a run interval. No-op if already running.
    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) {
        if !self.running {
            self.machine.start_at(now);
            self.running = true;
        }
    }

    /// End the current run interval, folding it into the accumulated
    /// uptime. No-op if not running, so repeated stops never double count.
    pub fn stop(&mut self) {
        self.stop_at(Utc::now());
    }

    pub fn stop_at(&mut self, now: DateTime<Utc>) {
        if self.running {
            self.accumulated_uptime = self.accumulated_uptime + self.machine.run_duration_at(now);
            self.machine.stop();
            self.running = false;
        }
    }

    /// Total billable uptime: completed intervals plus the open one
    pub fn billable_uptime(&self) -> Duration {
        self.billable_uptime_at(Utc::now())
    }

    pub fn billable_uptime_at(&self, now: DateTime<Utc>) -> Duration {
        self.accumulated_uptime + self.machine.run_duration_at(now)
    }

    /// Cost accrued so far, rounded to cents. Pure: reading the cost of a
    /// running machine does not stop its clock.
    pub fn current_cost(&self) -> Decimal {
        self.current_cost_at(Utc::now())
    }

    pub fn current_cost_at(&self, now: DateTime<Utc>) -> Decimal {
        round_money(self.billable_minutes_at(now) * self.plan.per_minute_rate())
    }

    /// Display snapshot of this machine
    pub fn info(&self) -> MachineInfo {
        self.info_at(Utc::now())
    }

    pub fn info_at(&self, now: DateTime<Utc>) -> MachineInfo {
        let minutes = round_money(self.billable_minutes_at(now));
        MachineInfo {
            name: self.machine.name().to_string(),
            price_plan: self.plan.label().to_string(),
            status: self.status().label().to_string(),
            total_uptime_min: format!("{minutes:.2} min"),
        }
    }

    fn billable_minutes_at(&self, now: DateTime<Utc>) -> Decimal {
        let millis = self.billable_uptime_at(now).num_milliseconds();
        Decimal::from(millis) / Decimal::from(60_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn plan_rate_table() {
        assert_eq!(PricePlan::OneDollarPerMinute.per_minute_rate(), Decimal::ONE);
        assert_eq!(PricePlan::TwoDollarsPerMinute.per_minute_rate(), Decimal::TWO);
    }

    #[test]
    fn plan_from_menu_choice() {
        assert_eq!(
            PricePlan::from_menu_choice("1"),
            Some(PricePlan::OneDollarPerMinute)
        );
        assert_eq!(
            PricePlan::from_menu_choice("2"),
            Some(PricePlan::TwoDollarsPerMinute)
        );
        assert_eq!(PricePlan::from_menu_choice("3"), None);
        assert_eq!(PricePlan::from_menu_choice("abc"), None);
        assert_eq!(PricePlan::from_menu_choice("0"), None);
    }

    #[test]
    fn new_machine_is_stopped_and_free() {
        let machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        assert_eq!(machine.status(), MachineStatus::Stopped);
        assert_eq!(machine.current_cost_at(at(0)), Decimal::ZERO);
    }

    #[test]
    fn ninety_seconds_at_one_dollar_costs_one_fifty() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(90));
        assert_eq!(machine.current_cost_at(at(200)), dollars(150));
    }

    #[test]
    fn thirty_seconds_at_two_dollars_costs_one_dollar() {
        let mut machine = BilledMachine::new("m2", PricePlan::TwoDollarsPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(30));
        assert_eq!(machine.current_cost_at(at(200)), dollars(100));
    }

    #[test]
    fn cost_includes_the_open_interval_without_stopping_it() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        assert_eq!(machine.current_cost_at(at(60)), dollars(100));
        // still running; the clock keeps going
        assert_eq!(machine.status(), MachineStatus::Running);
        assert_eq!(machine.current_cost_at(at(120)), dollars(200));
    }

    #[test]
    fn repeated_stop_does_not_double_count() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(90));
        machine.stop_at(at(500));
        assert_eq!(machine.billable_uptime_at(at(500)), Duration::seconds(90));
        assert_eq!(machine.current_cost_at(at(500)), dollars(150));
    }

    #[test]
    fn repeated_start_keeps_the_original_interval() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.start_at(at(60));
        machine.stop_at(at(90));
        assert_eq!(machine.billable_uptime_at(at(90)), Duration::seconds(90));
    }

    #[test]
    fn uptime_accumulates_across_cycles() {
        let mut machine = BilledMachine::new("m1", PricePlan::TwoDollarsPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(30));
        machine.start_at(at(100));
        machine.stop_at(at(130));
        assert_eq!(machine.billable_uptime_at(at(130)), Duration::seconds(60));
        assert_eq!(machine.current_cost_at(at(130)), dollars(200));
    }

    #[test]
    fn cost_is_stable_while_stopped() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(45));
        assert_eq!(
            machine.current_cost_at(at(60)),
            machine.current_cost_at(at(3600))
        );
    }

    #[test]
    fn midpoint_rounds_half_up() {
        // 0.3 s = 0.005 min; banker's rounding would give 0.00
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(0) + Duration::milliseconds(300));
        assert_eq!(machine.current_cost_at(at(10)), dollars(1));
    }

    #[test]
    fn info_snapshot_formats_uptime_to_two_decimals() {
        let mut machine = BilledMachine::new("m1", PricePlan::OneDollarPerMinute);
        machine.start_at(at(0));
        machine.stop_at(at(90));
        let info = machine.info_at(at(90));
        assert_eq!(
            info,
            MachineInfo {
                name: "m1".to_string(),
                price_plan: "One Dollar Per Minute".to_string(),
                status: "Stopped".to_string(),
                total_uptime_min: "1.50 min".to_string(),
            }
        );
    }

    #[test]
    fn info_reports_running_status() {
        let mut machine = BilledMachine::new("m1", PricePlan::TwoDollarsPerMinute);
        machine.start_at(at(0));
        let info = machine.info_at(at(0));
        assert_eq!(info.status, "Running");
        assert_eq!(info.total_uptime_min, "0.00 min");
    }
}
