// SPDX-License-Identifier: MIT

//! depend-rs: enable or disable form elements from rules over other elements

pub mod depend;
pub mod dom;
pub mod error;
pub mod scenario;

pub use error::{DependError, Result};
