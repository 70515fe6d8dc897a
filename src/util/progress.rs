//! Progress indicator for the per-project conversion loop.
//!
//! Bars only draw when stderr is an interactive terminal, so piped runs and
//! tests stay quiet.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};

/// Check if we should show progress indicators.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a determinate progress bar, hidden when `show` is false.
#[must_use]
pub fn create_progress_bar(total: u64, message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(message.to_string());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Progress bar wrapper that remembers whether it draws.
pub struct ProgressTracker {
    bar: ProgressBar,
    showing: bool,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(total: u64, message: &str) -> Self {
        Self::with_visibility(total, message, should_show_progress())
    }

    #[must_use]
    pub fn with_visibility(total: u64, message: &str, show: bool) -> Self {
        Self {
            bar: create_progress_bar(total, message, show),
            showing: show,
        }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    #[must_use]
    pub const fn is_showing(&self) -> bool {
        self.showing
    }
}
