//! The shared overwrite-confirmation policy.
//!
//! One policy governs every destructive replacement of a named artifact
//! (raster, archival file, cumulative-table slice, CSV export, joined
//! layer): the pipeline asks the injected decision source, and anything
//! other than an explicit affirmative is a "no". Declines skip exactly
//! the guarded operation. The automation-friendly default is
//! [`AlwaysDeny`]; the interactive CLI opts into [`PromptDecision`].

use std::io::{self, BufRead, Write};

/// Decides whether an existing named artifact may be overwritten.
pub trait OverwriteDecision {
    /// `artifact` is a human-readable description of what already exists,
    /// e.g. `"The raster for the year 2020"`.
    fn decide(&self, artifact: &str) -> bool;
}

/// Never overwrite. The default for non-interactive contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDeny;

impl OverwriteDecision for AlwaysDeny {
    fn decide(&self, _artifact: &str) -> bool {
        false
    }
}

/// Always overwrite. For scripted reruns that want clean replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysApprove;

impl OverwriteDecision for AlwaysApprove {
    fn decide(&self, _artifact: &str) -> bool {
        true
    }
}

/// Ask on stdin. Only a trimmed, case-insensitive `yes` affirms; empty
/// input, anything else, or a failed read all deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptDecision;

impl OverwriteDecision for PromptDecision {
    fn decide(&self, artifact: &str) -> bool {
        print!("{artifact} already exists. Do you want to overwrite it? (yes/no): ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => line.trim().eq_ignore_ascii_case("yes"),
            Err(_) => false,
        }
    }
}
