//! Core types and error handling for pyvm.
//!
//! This module hosts the strongly-typed error taxonomy shared by every
//! other module, plus the [`ErrorContext`] wrapper that turns internal
//! errors into user-facing messages with actionable suggestions.

pub mod error;

pub use error::{ErrorContext, PyvmError, user_friendly_error};
