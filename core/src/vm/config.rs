//! Run configuration and result types.

use std::env;

use log::warn;

pub const TRACE_ENV: &str = "HOOKVM_TRACE";
pub const STEP_LIMIT_ENV: &str = "HOOKVM_STEP_LIMIT";

/// Options for a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Log every dispatched instruction at `trace` level.
    pub trace: bool,
    /// Abort with `StepLimitExceeded` after this many dispatched instructions.
    /// `None` runs until HALT or a fatal error.
    pub step_limit: Option<usize>,
}

impl RunOptions {
    pub fn traced() -> Self {
        RunOptions { trace: true, ..Self::default() }
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Read `HOOKVM_TRACE` and `HOOKVM_STEP_LIMIT`; unset or malformed values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        let trace = env::var(TRACE_ENV).map(|v| parse_flag(&v)).unwrap_or(false);
        let step_limit = match env::var(STEP_LIMIT_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("ignoring {}={:?}: {}", STEP_LIMIT_ENV, raw, e);
                    None
                }
            },
            Err(_) => None,
        };
        RunOptions { trace, step_limit }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Outcome of a run that reached HALT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions dispatched, including the final HALT.
    pub steps: usize,
    /// Index of the HALT instruction that ended the run.
    pub halted_at: usize,
}
