// SPDX-License-Identifier: MIT

//! Dependants configuration
//!
//! A configuration maps dependant selectors to the rules their current value
//! must satisfy. It can be built in code:
//!
//! ```rust
//! use depend_rs::depend::{Dependant, Dependants};
//!
//! let dependants = Dependants::new()
//!     .on("[name=agree]", Dependant::new().rule("equal", "yes"))
//!     .on("#email", Dependant::new().rule("notEqual", "").events(["change", "keyup"]));
//! assert_eq!(dependants.len(), 2);
//! ```
//!
//! or deserialized from YAML / JSON, keeping key order:
//!
//! ```yaml
//! "[name=agree]":
//!   rule: { equal: "yes" }
//! "#email":
//!   event: [change, keyup]
//!   rule: { notEqual: "" }
//! ```

use crate::dom::Selection;
use crate::error::{DependError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Inline predicate; it closes over whatever it needs and only sees the target
pub type InlineRule = Rc<dyn Fn(&Selection) -> bool>;

/// One entry of a dependant's rule map
#[derive(Clone)]
pub enum RuleSpec {
    /// Registered rule name and its parameter
    Named { name: String, param: Value },
    /// Inline predicate; the label only shows up in diagnostics
    Inline { label: String, predicate: InlineRule },
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSpec::Named { name, param } => write!(f, "{}: {}", name, param),
            RuleSpec::Inline { label, .. } => write!(f, "{}: <inline>", label),
        }
    }
}

/// Rules and events for a single dependant selector
#[derive(Debug, Clone, Default)]
pub struct Dependant {
    /// Events to watch; `None` falls back to the options' default events
    pub events: Option<Vec<String>>,
    /// Rules, combined with AND, in evaluation order
    pub rules: Vec<RuleSpec>,
}

impl Dependant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registered rule
    pub fn rule(mut self, name: impl Into<String>, param: impl Into<Value>) -> Self {
        self.rules.push(RuleSpec::Named {
            name: name.into(),
            param: param.into(),
        });
        self
    }

    /// Add an inline predicate
    pub fn custom<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Selection) -> bool + 'static,
    {
        self.rules.push(RuleSpec::Inline {
            label: label.into(),
            predicate: Rc::new(predicate),
        });
        self
    }

    /// Watch these events instead of the default ones
    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }
}

/// Ordered selector → dependant configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Dependants {
    entries: Vec<(String, Dependant)>,
}

impl Dependants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependant selector
    pub fn on(mut self, selector: impl Into<String>, dependant: Dependant) -> Self {
        self.entries.push((selector.into(), dependant));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dependant)> {
        self.entries.iter().map(|(s, d)| (s.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a JSON object configuration
    pub fn from_json(content: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(content)?;
        Self::try_from(map)
    }

    /// Parse a YAML mapping configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_yaml::from_str(content)?;
        Self::try_from(map)
    }
}

/// Dependant as written in a configuration file
#[derive(Debug, Deserialize)]
struct RawDependant {
    /// `None` only when the key is absent; an explicit `null` is kept
    #[serde(default, deserialize_with = "present")]
    event: Option<Value>,
    #[serde(default)]
    rule: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Dependants {
    type Error = DependError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let mut dependants = Dependants::new();
        for (selector, raw) in map {
            let raw: RawDependant = serde_json::from_value(raw)?;
            let events = match raw.event {
                None => None,
                Some(value) => Some(parse_events(&selector, value)?),
            };
            let rules = raw
                .rule
                .into_iter()
                .map(|(name, param)| RuleSpec::Named { name, param })
                .collect();
            dependants = dependants.on(selector, Dependant { events, rules });
        }
        Ok(dependants)
    }
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn parse_events(selector: &str, value: Value) -> Result<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(DependError::invalid_event(selector)),
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(DependError::invalid_event(selector)),
        })
        .collect()
}
