// SPDX-License-Identifier: MIT

//! Scenario files: a form, its dependency controls and interactions to replay

mod loader;
mod runner;
mod types;

pub use loader::ScenarioLoader;
pub use runner::{Report, Runner, StepReport};
pub use types::{ControlDef, Scenario, Step};
