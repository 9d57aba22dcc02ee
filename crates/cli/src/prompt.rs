//! Operator confirmation on stdin.

use std::io::{self, BufRead, Write};
use straddle_core::{AutoApprove, ConfirmationGate};
use tracing::warn;

/// Interactive gate: prints the prompt and reads a y/n answer from stdin.
///
/// Anything other than `y`/`yes` (case-insensitive) is a decline, including
/// a closed stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl ConfirmationGate for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        println!("{prompt}");
        print!("[y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!(error = %e, "could not read confirmation; declining");
                false
            }
        }
    }
}

/// Gate selected by the `--yes` flag.
pub enum CliGate {
    /// Prompt the operator on stdin.
    Interactive(StdinConfirm),
    /// Approve without prompting.
    Auto(AutoApprove),
}

impl CliGate {
    /// Builds the gate from the `--yes` flag.
    #[must_use]
    pub fn from_flag(auto_approve: bool) -> Self {
        if auto_approve {
            Self::Auto(AutoApprove)
        } else {
            Self::Interactive(StdinConfirm)
        }
    }
}

impl ConfirmationGate for CliGate {
    fn confirm(&self, prompt: &str) -> bool {
        match self {
            Self::Interactive(gate) => gate.confirm(prompt),
            Self::Auto(gate) => gate.confirm(prompt),
        }
    }
}
