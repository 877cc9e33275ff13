// SPDX-License-Identifier: MIT

//! Typed error handling for depend-rs
//!
//! Every failure in this crate is a configuration problem raised
//! synchronously while binding or evaluating rules. Nothing is retried.

use thiserror::Error;

/// Top-level error type for depend-rs
#[derive(Debug, Error)]
pub enum DependError {
    /// A selector resolved to no elements
    #[error("Dependant element not found: {selector}")]
    SelectorNotFound { selector: String },

    /// A rule name that is not registered (and has no inline predicate)
    #[error("Invalid dependency rule: {name}")]
    InvalidRule { name: String },

    /// A rule parameter (or the value it is compared with) has the wrong shape
    #[error("Invalid parameter for rule '{rule}': {reason}")]
    InvalidParam { rule: String, reason: String },

    /// A dependant's `event` option is not a list of event names
    #[error("Dependant <{selector}> has an invalid event option")]
    InvalidEvent { selector: String },

    /// An in-memory form operation referenced an unknown element id
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    /// Malformed scenario or failed scenario expectation
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, DependError>;

impl DependError {
    /// Create a selector-not-found error
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::SelectorNotFound {
            selector: selector.into(),
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(name: impl Into<String>) -> Self {
        Self::InvalidRule { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid event option error
    pub fn invalid_event(selector: impl Into<String>) -> Self {
        Self::InvalidEvent {
            selector: selector.into(),
        }
    }

    /// Create a scenario error
    pub fn scenario(message: impl Into<String>) -> Self {
        Self::Scenario(message.into())
    }

    /// True for the errors caused by a bad dependency configuration
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::SelectorNotFound { .. }
                | Self::InvalidRule { .. }
                | Self::InvalidParam { .. }
                | Self::InvalidEvent { .. }
        )
    }
}
