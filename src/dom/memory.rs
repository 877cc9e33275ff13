// SPDX-License-Identifier: MIT

//! In-memory form host
//!
//! A small document model good enough to drive the rule engine without a
//! browser: elements keep their value, checked and enabled state in cells,
//! and listeners are dispatched synchronously in registration order.
//!
//! Supported selectors: `*`, `#id`, `[name=x]` (optionally quoted and with a
//! tag prefix such as `input[name=x]`), and comma-separated unions of those.

use super::{Element, ElementKind, ElementRef, Event, FieldValue, Host, Listener, Selection};
use crate::error::{DependError, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Declarative description of a form element
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ElementDef {
    pub id: String,
    /// Group name shared by radios and checkboxes
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub checked: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ElementDef {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            value: FieldValue::Missing,
            checked: false,
            enabled: true,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A form control stored in a `MemoryForm`
#[derive(Debug)]
pub struct FormElement {
    id: String,
    name: Option<String>,
    kind: ElementKind,
    value: RefCell<FieldValue>,
    checked: Cell<bool>,
    enabled: Cell<bool>,
}

impl FormElement {
    fn from_def(def: ElementDef) -> Self {
        Self {
            id: def.id,
            name: def.name,
            kind: def.kind,
            value: RefCell::new(def.value),
            checked: Cell::new(def.checked),
            enabled: Cell::new(def.enabled),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn can_check(&self) -> bool {
        self.kind.is_checkable()
    }
}

impl Element for FormElement {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn value(&self) -> FieldValue {
        self.value.borrow().clone()
    }

    fn is_checked(&self) -> bool {
        self.checked.get()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

struct Subscriber {
    element: String,
    event: String,
    listener: Listener,
}

/// In-memory `Host` implementation
pub struct MemoryForm {
    elements: Vec<Rc<FormElement>>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl MemoryForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Build a form from element definitions, in document order
    pub fn from_defs(defs: Vec<ElementDef>) -> Result<Self> {
        let mut form = Self::new();
        for def in defs {
            form.add(def)?;
        }
        Ok(form)
    }

    /// Append an element. Ids must be unique.
    pub fn add(&mut self, def: ElementDef) -> Result<()> {
        if self.elements.iter().any(|e| e.id == def.id) {
            return Err(DependError::scenario(format!(
                "duplicate element id '{}'",
                def.id
            )));
        }
        self.elements.push(Rc::new(FormElement::from_def(def)));
        Ok(())
    }

    /// Look up an element by id
    pub fn element(&self, id: &str) -> Result<Rc<FormElement>> {
        self.elements
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| DependError::UnknownElement(id.to_string()))
    }

    /// Replace an element's raw value
    pub fn set_value(&self, id: &str, value: impl Into<FieldValue>) -> Result<()> {
        let element = self.element(id)?;
        *element.value.borrow_mut() = value.into();
        Ok(())
    }

    /// Set the checked state of a checkbox or radio
    pub fn set_checked(&self, id: &str, checked: bool) -> Result<()> {
        let element = self.element(id)?;
        if !element.can_check() {
            return Err(DependError::scenario(format!(
                "element '{}' cannot be checked",
                id
            )));
        }
        element.checked.set(checked);
        Ok(())
    }

    /// Check a radio and uncheck the other radios of its group
    pub fn choose(&self, id: &str) -> Result<()> {
        let element = self.element(id)?;
        if element.kind != ElementKind::Radio {
            return Err(DependError::scenario(format!("element '{}' is not a radio", id)));
        }
        for other in &self.elements {
            let same_group = other.name.is_some() && other.name == element.name;
            if other.kind == ElementKind::Radio && same_group {
                other.checked.set(false);
            }
        }
        element.checked.set(true);
        Ok(())
    }

    /// Enabled state of an element
    pub fn is_enabled(&self, id: &str) -> Result<bool> {
        Ok(self.element(id)?.is_enabled())
    }

    /// Fire an event on everything `selector` matches
    pub fn fire(&self, selector: &str, event: &str) -> Result<()> {
        let target = self.select(selector);
        if target.is_empty() {
            return Err(DependError::not_found(selector));
        }
        self.trigger(&target, event)
    }

    /// Number of registered (element, event) listeners
    pub fn listener_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn matches(&self, element: &FormElement, selector: &str) -> bool {
        if selector == "*" {
            return true;
        }
        if let Some(id) = selector.strip_prefix('#') {
            return element.id == id;
        }
        if let Some(start) = selector.find("[name=") {
            let rest = &selector[start + "[name=".len()..];
            if let Some(name) = rest.strip_suffix(']') {
                let name = name.trim_matches(|c| c == '"' || c == '\'');
                return element.name.as_deref() == Some(name);
            }
        }
        false
    }
}

impl Default for MemoryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryForm {
    fn select(&self, selector: &str) -> Selection {
        let parts: Vec<&str> = selector
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut seen = HashSet::new();
        let elements: Vec<ElementRef> = self
            .elements
            .iter()
            .filter(|e| parts.iter().any(|p| self.matches(e, p)))
            .filter(|e| seen.insert(e.id.clone()))
            .map(|e| e.clone() as ElementRef)
            .collect();

        Selection::new(selector, elements)
    }

    fn listen(&self, target: &Selection, event: &str, listener: Listener) {
        let mut subscribers = self.subscribers.borrow_mut();
        for element in target.elements() {
            subscribers.push(Subscriber {
                element: element.id(),
                event: event.to_string(),
                listener: listener.clone(),
            });
        }
    }

    fn trigger(&self, target: &Selection, event: &str) -> Result<()> {
        for element in target.elements() {
            let id = element.id();
            // Snapshot so listeners may subscribe or trigger while we dispatch
            let listeners: Vec<Listener> = self
                .subscribers
                .borrow()
                .iter()
                .filter(|s| s.element == id && s.event == event)
                .map(|s| s.listener.clone())
                .collect();

            let fired = Event {
                name: event.to_string(),
                target: id,
            };
            for listener in listeners {
                listener(&fired)?;
            }
        }
        Ok(())
    }
}
