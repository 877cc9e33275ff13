// SPDX-License-Identifier: MIT

//! Host document abstraction
//!
//! The rule engine never owns form elements. It talks to whatever document
//! hosts them through two traits:
//! - `Element` - one form control (identity, kind, value, checked/enabled state)
//! - `Host` - selector lookup plus synchronous event subscription and dispatch
//!
//! `memory::MemoryForm` is a complete in-memory host used by the scenario
//! runner and the tests.

pub mod memory;
pub mod value;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

pub use value::FieldValue;

/// Kind of form control, as far as value extraction cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// Free text input (the default)
    #[default]
    Text,
    /// Single-choice select
    Select,
    /// Multiple-choice select, its raw value is a list
    MultiSelect,
    /// Radio button, grouped by name
    Radio,
    /// Checkbox, grouped by name
    Checkbox,
    /// Button or any other control without a meaningful value
    Button,
}

impl ElementKind {
    /// Radios and checkboxes carry a checked state
    pub fn is_checkable(self) -> bool {
        matches!(self, ElementKind::Radio | ElementKind::Checkbox)
    }
}

/// A single form control living in the host document
pub trait Element {
    /// Stable identity used in traces and event targets
    fn id(&self) -> String;

    /// Control kind
    fn kind(&self) -> ElementKind;

    /// Raw value of this control alone (no group handling)
    fn value(&self) -> FieldValue;

    /// Checked state (always false for controls that cannot be checked)
    fn is_checked(&self) -> bool;

    /// Whether the control is currently enabled
    fn is_enabled(&self) -> bool;

    /// Enable or disable the control
    fn set_enabled(&self, enabled: bool);
}

/// Shared handle to a host element
pub type ElementRef = Rc<dyn Element>;

/// The elements matched by one selector, in document order
#[derive(Clone)]
pub struct Selection {
    selector: String,
    elements: Vec<ElementRef>,
}

impl Selection {
    pub fn new(selector: impl Into<String>, elements: Vec<ElementRef>) -> Self {
        Self {
            selector: selector.into(),
            elements,
        }
    }

    /// The selector this selection was resolved from
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn elements(&self) -> &[ElementRef] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if any matched element has the given kind
    pub fn is(&self, kind: ElementKind) -> bool {
        self.elements.iter().any(|e| e.kind() == kind)
    }

    /// Checked state of the first matched element; `None` when the selection
    /// is empty or that element is not a radio or checkbox
    pub fn checked(&self) -> Option<bool> {
        self.elements
            .first()
            .filter(|e| e.kind().is_checkable())
            .map(|e| e.is_checked())
    }

    /// Enabled state of the first matched element
    pub fn is_enabled(&self) -> bool {
        self.elements.first().map(|e| e.is_enabled()).unwrap_or(false)
    }

    /// Enable or disable every matched element
    pub fn set_enabled(&self, enabled: bool) {
        for element in &self.elements {
            element.set_enabled(enabled);
        }
    }

    /// Current value, see `value::extract`
    pub fn value(&self) -> FieldValue {
        value::extract(self)
    }

    /// Identities of the matched elements
    pub fn ids(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.id()).collect()
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("selector", &self.selector)
            .field("elements", &self.ids())
            .finish()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)
    }
}

/// An event delivered to a listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name, e.g. "change"
    pub name: String,
    /// Identity of the element the event fired on
    pub target: String,
}

/// Event callback registered with a host. Errors propagate to `Host::trigger`.
pub type Listener = Rc<dyn Fn(&Event) -> Result<()>>;

/// The document collaborator the rule engine is embedded in.
///
/// All dispatch is synchronous: `trigger` returns after every listener ran.
pub trait Host {
    /// Resolve a selector. An empty selection means nothing matched.
    fn select(&self, selector: &str) -> Selection;

    /// Subscribe `listener` to `event` on every element of `target`
    fn listen(&self, target: &Selection, event: &str, listener: Listener);

    /// Fire `event` on every element of `target`, stopping at the first error
    fn trigger(&self, target: &Selection, event: &str) -> Result<()>;
}
