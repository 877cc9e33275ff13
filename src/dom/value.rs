// SPDX-License-Identifier: MIT

//! Element value extraction

use super::{ElementKind, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current value of a control or control group
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Nothing selected (unchecked radio group, empty selection)
    #[default]
    Missing,
    /// Single value (text input, select, checked radio)
    Scalar(String),
    /// Several values (checkbox group, multi-select)
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Scalar(s)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(l: Vec<&str>) -> Self {
        FieldValue::List(l.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "<missing>"),
            FieldValue::Scalar(s) => write!(f, "\"{}\"", s),
            FieldValue::List(l) => write!(f, "{:?}", l),
        }
    }
}

/// Read the current value of a selection.
///
/// - radio group: value of the checked member, or `Missing`
/// - checkbox group: values of the checked members, in selection order
/// - anything else: raw value of the first element
pub fn extract(selection: &Selection) -> FieldValue {
    if selection.is(ElementKind::Radio) {
        return selection
            .elements()
            .iter()
            .find(|e| e.is_checked())
            .map(|e| e.value())
            .unwrap_or(FieldValue::Missing);
    }

    if selection.is(ElementKind::Checkbox) {
        let values = selection
            .elements()
            .iter()
            .filter(|e| e.is_checked())
            .filter_map(|e| match e.value() {
                FieldValue::Scalar(s) => Some(s),
                _ => None,
            })
            .collect();
        return FieldValue::List(values);
    }

    selection
        .elements()
        .first()
        .map(|e| e.value())
        .unwrap_or(FieldValue::Missing)
}
