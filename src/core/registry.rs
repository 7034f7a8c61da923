//! Registry - Central owner of all billed machines

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use super::billing::{BilledMachine, MachineInfo, PricePlan};
use super::error::{Error, Result};

/// Owns every live machine and the cost banked from deleted ones.
///
/// Machines are kept in creation order and looked up by case-sensitive name.
/// At any time, total cost = `banked_cost` + the current cost of every live
/// machine. Failed operations leave the registry unchanged.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    machines: Vec<BilledMachine>,
    banked_cost: Decimal,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new stopped machine under the given plan
    pub fn create_machine(&mut self, name: impl Into<String>, plan: PricePlan) -> Result<()> {
        let name = name.into();
        if self.exists(&name) {
            return Err(Error::DuplicateName(name));
        }
        info!("Created machine '{}' ({})", name, plan.label());
        self.machines.push(BilledMachine::new(name, plan));
        Ok(())
    }

    /// Stop a machine, bank its final cost, and discard it
    pub fn delete_machine(&mut self, name: &str) -> Result<()> {
        self.delete_machine_at(name, Utc::now())
    }

    pub fn delete_machine_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
        let index = self
            .machines
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let mut machine = self.machines.remove(index);
        machine.stop_at(now);
        let final_cost = machine.current_cost_at(now);
        self.banked_cost += final_cost;

        info!("Deleted machine '{}' (final cost: {})", name, final_cost);
        Ok(())
    }

    /// Start a machine. Idempotent per machine.
    pub fn start_machine(&mut self, name: &str) -> Result<()> {
        self.start_machine_at(name, Utc::now())
    }

    pub fn start_machine_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
        self.find_mut(name)?.start_at(now);
        Ok(())
    }

    /// Stop a machine. Idempotent per machine.
    pub fn stop_machine(&mut self, name: &str) -> Result<()> {
        self.stop_machine_at(name, Utc::now())
    }

    pub fn stop_machine_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
        self.find_mut(name)?.stop_at(now);
        Ok(())
    }

    /// Start every live machine
    pub fn start_all(&mut self) {
        self.start_all_at(Utc::now());
    }

    pub fn start_all_at(&mut self, now: DateTime<Utc>) {
        for machine in &mut self.machines {
            machine.start_at(now);
        }
    }

    /// Stop every live machine
    pub fn stop_all(&mut self) {
        self.stop_all_at(Utc::now());
    }

    pub fn stop_all_at(&mut self, now: DateTime<Utc>) {
        for machine in &mut self.machines {
            machine.stop_at(now);
        }
    }

    /// Current cost of a single machine
    pub fn machine_cost(&self, name: &str) -> Result<Decimal> {
        self.machine_cost_at(name, Utc::now())
    }

    pub fn machine_cost_at(&self, name: &str, now: DateTime<Utc>) -> Result<Decimal> {
        Ok(self.find(name)?.current_cost_at(now))
    }

    /// Banked cost plus the current cost of every live machine
    pub fn total_cost(&self) -> Decimal {
        self.total_cost_at(Utc::now())
    }

    pub fn total_cost_at(&self, now: DateTime<Utc>) -> Decimal {
        let live: Decimal = self
            .machines
            .iter()
            .map(|m| m.current_cost_at(now))
            .sum();
        (self.banked_cost + live).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Live machine names in creation order
    pub fn machine_names(&self) -> Vec<String> {
        self.machines.iter().map(|m| m.name().to_string()).collect()
    }

    /// Display snapshot of a single machine
    pub fn machine_info(&self, name: &str) -> Result<MachineInfo> {
        self.machine_info_at(name, Utc::now())
    }

    pub fn machine_info_at(&self, name: &str, now: DateTime<Utc>) -> Result<MachineInfo> {
        Ok(self.find(name)?.info_at(now))
    }

    /// Display snapshots of every live machine, in creation order
    pub fn all_machine_info(&self) -> Vec<MachineInfo> {
        self.all_machine_info_at(Utc::now())
    }

    pub fn all_machine_info_at(&self, now: DateTime<Utc>) -> Vec<MachineInfo> {
        self.machines.iter().map(|m| m.info_at(now)).collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.machines.iter().any(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    fn find(&self, name: &str) -> Result<&BilledMachine> {
        self.machines
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut BilledMachine> {
        self.machines
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}
