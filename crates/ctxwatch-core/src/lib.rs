//! Core library for ctxwatch.
//!
//! ctxwatch is a stop-hook companion for interactive agent sessions: once per
//! agent turn it reads the tail of the session transcript, works out how much
//! of the model's context window the latest assistant turn occupied, and
//! produces at most one advisory line when usage crosses a threshold.
//!
//! The pipeline is:
//!
//! 1. [`hook`] — decode the hook payload and apply the re-entrancy guard
//! 2. [`transcript`] — bounded tail read of the JSONL transcript
//! 3. [`usage`] — find the latest usage-bearing assistant record
//! 4. [`budget`] — integer percentage of the configured capacity
//! 5. [`advisory`] — map the percentage to a soft/strong tier
//!
//! [`monitor`] wires these together. Every failure along the way collapses
//! to "no advisory"; nothing here is allowed to disturb the host.

pub mod advisory;
pub mod budget;
pub mod config;
pub mod error;
pub mod hook;
pub mod monitor;
pub mod transcript;
pub mod usage;

pub use error::MonitorError;
