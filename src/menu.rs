//! Interactive text menu over the machine registry
//!
//! Thin glue layer: all prompting and printing happens here, never in the
//! core. Driven by any `BufRead`/`Write` pair so sessions can be scripted.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::core::{Error, MachineInfo, PricePlan, Registry};

const DIVIDER: &str = "----------------------------------------------------------";

/// Numbered menu actions, in display order
const ACTIONS: &[(&str, &str)] = &[
    ("1", "List Machines"),
    ("2", "Create Machine"),
    ("3", "Delete Machine"),
    ("4", "Start Machine"),
    ("5", "Stop Machine"),
    ("6", "Start All Machines"),
    ("7", "Stop All Machines"),
    ("8", "Get Machine Cost"),
    ("9", "Get Total Cost"),
];

/// Interactive menu session over an input/output pair
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run the menu loop until the input stream is exhausted
    pub fn run(mut self, registry: &mut Registry) -> Result<()> {
        loop {
            self.print_menu()?;

            // keep prompting until a valid selection
            let selection = loop {
                let Some(line) = self.read_line()? else {
                    return Ok(());
                };
                let choice = line.trim().to_string();
                if ACTIONS.iter().any(|(id, _)| *id == choice) {
                    break choice;
                }
                writeln!(self.output, "Input not valid!")?;
            };

            debug!("Menu selection: {}", selection);
            writeln!(self.output, "{DIVIDER}")?;
            if self.dispatch(&selection, registry)?.is_none() {
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "{DIVIDER}")?;
        for (id, title) in ACTIONS {
            writeln!(self.output, "{id}. {title}")?;
        }
        writeln!(self.output, "{DIVIDER}")?;
        Ok(())
    }

    /// Returns `None` when the input stream ended mid-action
    fn dispatch(&mut self, selection: &str, registry: &mut Registry) -> Result<Option<()>> {
        match selection {
            "1" => self.list_machines(registry)?,
            "2" => return self.create_machine(registry),
            "3" => return self.delete_machine(registry),
            "4" => return self.start_machine(registry),
            "5" => return self.stop_machine(registry),
            "6" => {
                registry.start_all();
                self.list_machines(registry)?;
            }
            "7" => {
                registry.stop_all();
                self.list_machines(registry)?;
            }
            "8" => return self.machine_cost(registry),
            "9" => writeln!(self.output, "Total Cost: {}$", registry.total_cost())?,
            _ => unreachable!("selection validated against the action table"),
        }
        Ok(Some(()))
    }

    fn list_machines(&mut self, registry: &Registry) -> Result<()> {
        let listing = serde_json::to_string(&registry.all_machine_info())?;
        writeln!(self.output, "Machines: {listing}")?;
        Ok(())
    }

    fn create_machine(&mut self, registry: &mut Registry) -> Result<Option<()>> {
        let Some(name) = self.prompt("Machine Name:")? else {
            return Ok(None);
        };

        if registry.exists(&name) {
            writeln!(self.output, "Machine with name '{name}' already exists!")?;
            return Ok(Some(()));
        }

        writeln!(self.output, "Price Plan:")?;
        for (index, plan) in PricePlan::all().iter().enumerate() {
            writeln!(self.output, "{}. {}", index + 1, plan.label())?;
        }
        let Some(choice) = self.read_line()? else {
            return Ok(None);
        };
        let Some(plan) = PricePlan::from_menu_choice(&choice) else {
            writeln!(self.output, "Input not valid!")?;
            return Ok(Some(()));
        };

        registry.create_machine(&name, plan)?;
        let info = registry.machine_info(&name)?;
        writeln!(self.output, "Machine Created: {}", render(&info)?)?;
        Ok(Some(()))
    }

    fn delete_machine(&mut self, registry: &mut Registry) -> Result<Option<()>> {
        self.list_machines(registry)?;
        let Some(name) = self.prompt("Machine Name:")? else {
            return Ok(None);
        };

        // capture the snapshot before the machine is discarded
        match registry.machine_info(&name) {
            Ok(info) => {
                registry.delete_machine(&name)?;
                writeln!(self.output, "Machine Deleted: {}", render(&info)?)?;
            }
            Err(Error::NotFound(_)) => self.report_missing(&name)?,
            Err(err) => return Err(err.into()),
        }
        Ok(Some(()))
    }

    fn start_machine(&mut self, registry: &mut Registry) -> Result<Option<()>> {
        self.list_machines(registry)?;
        let Some(name) = self.prompt("Machine Name:")? else {
            return Ok(None);
        };

        match registry.start_machine(&name) {
            Ok(()) => {
                let info = registry.machine_info(&name)?;
                writeln!(self.output, "Machine Started: {}", render(&info)?)?;
            }
            Err(Error::NotFound(_)) => self.report_missing(&name)?,
            Err(err) => return Err(err.into()),
        }
        Ok(Some(()))
    }

    fn stop_machine(&mut self, registry: &mut Registry) -> Result<Option<()>> {
        self.list_machines(registry)?;
        let Some(name) = self.prompt("Machine Name:")? else {
            return Ok(None);
        };

        match registry.stop_machine(&name) {
            Ok(()) => {
                let info = registry.machine_info(&name)?;
                writeln!(self.output, "Machine Stopped: {}", render(&info)?)?;
            }
            Err(Error::NotFound(_)) => self.report_missing(&name)?,
            Err(err) => return Err(err.into()),
        }
        Ok(Some(()))
    }

    fn machine_cost(&mut self, registry: &mut Registry) -> Result<Option<()>> {
        self.list_machines(registry)?;
        let Some(name) = self.prompt("Machine Name:")? else {
            return Ok(None);
        };

        match registry.machine_cost(&name) {
            Ok(cost) => writeln!(self.output, "Machine Cost: {cost}$")?,
            Err(Error::NotFound(_)) => self.report_missing(&name)?,
            Err(err) => return Err(err.into()),
        }
        Ok(Some(()))
    }

    fn report_missing(&mut self, name: &str) -> Result<()> {
        writeln!(self.output, "Machine with name '{name}' does not exist!")?;
        Ok(())
    }

    /// Print a label line, then read one answer. `None` on end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        writeln!(self.output, "{label}")?;
        Ok(self.read_line()?.map(|line| line.trim().to_string()))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        write!(self.output, ">")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

fn render(info: &MachineInfo) -> Result<String> {
    Ok(serde_json::to_string(info)?)
}
