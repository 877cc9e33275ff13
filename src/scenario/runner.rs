// SPDX-License-Identifier: MIT

//! Scenario replay
//!
//! Builds an in-memory form, attaches every control and replays the steps,
//! recording the enabled state of each controlled element after every step.

use super::types::{ControlDef, Scenario, Step};
use crate::depend::{Depend, RuleRegistry};
use crate::dom::memory::MemoryForm;
use crate::dom::Host;
use crate::error::{DependError, Result};
use std::fmt;

/// Enabled state of the controlled elements after one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Step description; `None` for the state right after attaching
    pub step: Option<String>,
    /// (element id, enabled) for every controlled element
    pub states: Vec<(String, bool)>,
}

/// Outcome of a replayed scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        for (i, report) in self.steps.iter().enumerate() {
            let states: Vec<String> = report
                .states
                .iter()
                .map(|(id, enabled)| {
                    format!("#{} {}", id, if *enabled { "enabled" } else { "disabled" })
                })
                .collect();
            match &report.step {
                Some(step) => writeln!(f, "[{}] {} -> {}", i, step, states.join(", "))?,
                None => writeln!(f, "[{}] attached -> {}", i, states.join(", "))?,
            }
        }
        Ok(())
    }
}

/// Replays scenarios against a rule registry
pub struct Runner {
    registry: RuleRegistry,
}

impl Runner {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Build the form and attach every control without replaying steps
    pub fn check(&self, scenario: &Scenario) -> Result<()> {
        let form = MemoryForm::from_defs(scenario.elements.clone())?;
        let controls = self.attach_all(&form, &scenario.controls)?;
        log::info!(
            "Scenario '{}': {} controls attached, {} listeners",
            scenario.name,
            controls.len(),
            form.listener_count()
        );
        Ok(())
    }

    /// Replay the scenario and report the state after every step
    pub fn run(&self, scenario: &Scenario) -> Result<Report> {
        let form = MemoryForm::from_defs(scenario.elements.clone())?;
        let controls = self.attach_all(&form, &scenario.controls)?;

        let mut steps = vec![StepReport {
            step: None,
            states: states(&controls),
        }];

        for step in &scenario.steps {
            log::debug!("Step: {}", step);
            match step {
                Step::Set { id, value } => form.set_value(id, value.clone())?,
                Step::Check { id, checked } => form.set_checked(id, *checked)?,
                Step::Choose(id) => form.choose(id)?,
                Step::Fire { selector, event } => form.fire(selector, event)?,
                Step::Exec => {
                    for control in &controls {
                        control.exec()?;
                    }
                }
                Step::Expect { id, enabled } => {
                    let actual = form.is_enabled(id)?;
                    if actual != *enabled {
                        return Err(DependError::scenario(format!(
                            "expected #{} enabled = {}, found {}",
                            id, enabled, actual
                        )));
                    }
                }
            }
            steps.push(StepReport {
                step: Some(step.to_string()),
                states: states(&controls),
            });
        }

        Ok(Report {
            name: scenario.name.clone(),
            steps,
        })
    }

    fn attach_all<'h>(&self, host: &'h dyn Host, defs: &[ControlDef]) -> Result<Vec<Depend<'h>>> {
        defs.iter().map(|def| self.attach(host, def)).collect()
    }

    fn attach<'h>(&self, host: &'h dyn Host, def: &ControlDef) -> Result<Depend<'h>> {
        let (first, rest) = def.depends.split_first().ok_or_else(|| {
            DependError::scenario(format!("control '{}' has no dependants", def.element))
        })?;

        let depend = Depend::builder()
            .registry(self.registry.clone())
            .options(def.options.clone())
            .attach(host, &def.element, first)?;
        for dependants in rest {
            depend.or(dependants)?;
        }
        Ok(depend)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(crate::depend::registry().clone())
    }
}

fn states(controls: &[Depend<'_>]) -> Vec<(String, bool)> {
    controls
        .iter()
        .flat_map(|c| c.element().elements().iter())
        .map(|e| (e.id(), e.is_enabled()))
        .collect()
}
