//! Core module - Machine lifecycle and cost accrual

mod billing;
mod error;
mod machine;
mod registry;

pub use billing::{BilledMachine, MachineInfo, MachineStatus, PricePlan};
pub use error::{Error, Result};
pub use machine::Machine;
pub use registry::Registry;
