// SPDX-License-Identifier: MIT

//! Controller options and the process-wide defaults
//!
//! Effective options for a controller are the global defaults with the
//! per-call `OptionsOverride` layered on top, key by key. They are fixed when
//! the controller is built; later `configure` calls do not touch it.

use crate::dom::Selection;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Effect applied to the controlled element
pub type Effect = Arc<dyn Fn(&Selection) + Send + Sync>;

static DEFAULTS: Lazy<RwLock<Options>> = Lazy::new(|| RwLock::new(Options::default()));

/// Options of one dependency controller
#[derive(Clone)]
pub struct Options {
    /// Log every evaluation
    pub debug: bool,
    /// Events watched when a dependant does not name its own
    pub events: Vec<String>,
    /// Run once when the controller is created
    pub on_init: Effect,
    /// Run when an evaluation passes
    pub on_pass: Effect,
    /// Run when an evaluation fails
    pub on_not_pass: Effect,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            events: vec!["change".to_string()],
            on_init: Arc::new(|element: &Selection| element.set_enabled(false)),
            on_pass: Arc::new(|element: &Selection| element.set_enabled(true)),
            on_not_pass: Arc::new(|element: &Selection| element.set_enabled(false)),
        }
    }
}

impl Options {
    /// These options with every key set in `overrides` replaced
    pub fn merged(&self, overrides: &OptionsOverride) -> Self {
        Self {
            debug: overrides.debug.unwrap_or(self.debug),
            events: overrides
                .events
                .clone()
                .unwrap_or_else(|| self.events.clone()),
            on_init: overrides
                .on_init
                .clone()
                .unwrap_or_else(|| self.on_init.clone()),
            on_pass: overrides
                .on_pass
                .clone()
                .unwrap_or_else(|| self.on_pass.clone()),
            on_not_pass: overrides
                .on_not_pass
                .clone()
                .unwrap_or_else(|| self.on_not_pass.clone()),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("debug", &self.debug)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Partial options; unset keys keep the base value.
///
/// `debug` and `event` can be read from configuration files, effects only
/// from code.
#[derive(Clone, Default, Deserialize)]
pub struct OptionsOverride {
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default, rename = "event")]
    pub events: Option<Vec<String>>,
    #[serde(skip)]
    pub on_init: Option<Effect>,
    #[serde(skip)]
    pub on_pass: Option<Effect>,
    #[serde(skip)]
    pub on_not_pass: Option<Effect>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&Selection) + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(f));
        self
    }

    pub fn on_pass<F>(mut self, f: F) -> Self
    where
        F: Fn(&Selection) + Send + Sync + 'static,
    {
        self.on_pass = Some(Arc::new(f));
        self
    }

    pub fn on_not_pass<F>(mut self, f: F) -> Self
    where
        F: Fn(&Selection) + Send + Sync + 'static,
    {
        self.on_not_pass = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for OptionsOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsOverride")
            .field("debug", &self.debug)
            .field("events", &self.events)
            .field("on_init", &self.on_init.is_some())
            .field("on_pass", &self.on_pass.is_some())
            .field("on_not_pass", &self.on_not_pass.is_some())
            .finish()
    }
}

/// Current process-wide defaults
pub fn defaults() -> Options {
    DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Layer `overrides` onto the process-wide defaults
pub fn configure(overrides: &OptionsOverride) {
    let mut defaults = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    *defaults = defaults.merged(overrides);
    log::debug!("Global options now {:?}", *defaults);
}

/// Restore the built-in defaults
pub fn reset_defaults() {
    *DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = Options::default();
}
