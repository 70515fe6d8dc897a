//! Shared utilities for `nozbe_org`.
//!
//! - Time formatting for Org date stamps
//! - Progress indicators for the conversion loop

pub mod progress;
pub mod time;
