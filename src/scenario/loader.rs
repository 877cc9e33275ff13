//! Scenario loader - YAML file loading and parsing

use super::types::Scenario;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Loads scenario definitions from YAML (or JSON) files
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a scenario from a file
    pub fn load_scenario<P: AsRef<Path>>(&self, path: P) -> Result<Scenario> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a scenario from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        Ok(scenario)
    }
}

impl Default for ScenarioLoader {
    fn default() -> Self {
        Self::new()
    }
}
