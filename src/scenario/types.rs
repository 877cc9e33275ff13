// SPDX-License-Identifier: MIT

//! YAML schema types for scenario files
//!
//! A scenario describes a form, the dependency controls attached to it and a
//! sequence of user interactions to replay.

use crate::depend::{Dependants, OptionsOverride};
use crate::dom::memory::ElementDef;
use crate::dom::FieldValue;
use serde::Deserialize;
use std::fmt;

/// Top-level scenario definition
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Form elements, in document order
    pub elements: Vec<ElementDef>,
    /// Dependency controls, attached in order
    #[serde(default)]
    pub controls: Vec<ControlDef>,
    /// Interactions to replay, written as `- set: {...}` single-key maps
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

/// One controlled element and its dependants
#[derive(Debug, Deserialize)]
pub struct ControlDef {
    /// Selector of the controlled element
    pub element: String,
    /// Per-control options (`debug`, `event`)
    #[serde(default)]
    pub options: OptionsOverride,
    /// First entry is attached, the others are chained with `or`
    pub depends: Vec<Dependants>,
}

/// A single interaction
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Replace an element's value
    Set { id: String, value: FieldValue },
    /// Check or uncheck a checkbox / radio
    Check { id: String, checked: bool },
    /// Select a radio, unchecking the rest of its group
    Choose(String),
    /// Fire an event on a selector
    Fire {
        selector: String,
        #[serde(default = "default_event")]
        event: String,
    },
    /// Replay every control's watched events
    Exec,
    /// Assert an element's enabled state
    Expect { id: String, enabled: bool },
}

fn default_event() -> String {
    "change".to_string()
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Set { id, value } => write!(f, "set #{} = {}", id, value),
            Step::Check { id, checked } => write!(f, "check #{} = {}", id, checked),
            Step::Choose(id) => write!(f, "choose #{}", id),
            Step::Fire { selector, event } => write!(f, "fire {} on {}", event, selector),
            Step::Exec => write!(f, "exec"),
            Step::Expect { id, enabled } => write!(f, "expect #{} enabled = {}", id, enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Choose("yes".into()).to_string(), "choose #yes");
        assert_eq!(
            Step::Fire {
                selector: "[name=agree]".into(),
                event: "change".into()
            }
            .to_string(),
            "fire change on [name=agree]"
        );
        assert_eq!(
            Step::Set {
                id: "email".into(),
                value: FieldValue::from("a")
            }
            .to_string(),
            "set #email = \"a\""
        );
    }

    #[test]
    fn test_parse_steps() {
        let yaml = r##"
name: Steps
elements: []
steps:
  - set: { id: email, value: "a@b.c" }
  - set: { id: colors, value: [red, blue] }
  - check: { id: tos, checked: true }
  - choose: agree-yes
  - fire: { selector: "#email" }
  - exec
  - expect: { id: submit, enabled: false }
"##;
        let steps = serde_yaml::from_str::<Scenario>(yaml).unwrap().steps;
        assert_eq!(steps.len(), 7);
        assert_eq!(
            steps[1],
            Step::Set {
                id: "colors".into(),
                value: FieldValue::from(vec!["red", "blue"])
            }
        );
        assert_eq!(
            steps[4],
            Step::Fire {
                selector: "#email".into(),
                event: "change".into()
            }
        );
        assert_eq!(steps[3], Step::Choose("agree-yes".into()));
        assert_eq!(steps[5], Step::Exec);
    }

    #[test]
    fn test_steps_default_to_empty() {
        let scenario: Scenario = serde_yaml::from_str("name: Idle\nelements: []\n").unwrap();
        assert!(scenario.steps.is_empty());
    }
}
