//! Montage Core - Foundation types for the compositing engine
//!
//! This crate provides the error taxonomy shared by every Montage crate
//! and small time-formatting helpers used for logging and progress display.

pub mod error;
pub mod time;

pub use error::{MontageError, Result};
pub use time::{format_clock, format_eta};
