//! Diagnostic reporting for binding generation.
//!
//! Generation itself never fails: a binding gap shows up as a visible type
//! name in the emitted source. Diagnostics are the side channel used by model
//! validation to point at declarations that need a human look, and they are
//! rendered through miette by the CLI.

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic, Serialize)]
#[error("{level}: {subject}: {message}")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Qualified name of the declaration the diagnostic is about,
    /// e.g. `IVRSystem::PollNextEvent`.
    pub subject: String,
    pub message: String,
    #[help]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            subject: subject.into(),
            message: message.into(),
            help: None,
        }
    }

    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            subject: subject.into(),
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_level_and_subject() {
        let diag = Diagnostic::warning("IVRSystem::PollNextEvent", "unclassified size parameter");
        assert_eq!(
            diag.to_string(),
            "warning: IVRSystem::PollNextEvent: unclassified size parameter"
        );
        assert!(!diag.is_error());
    }

    #[test]
    fn test_help_is_attached() {
        let diag = Diagnostic::error("VR_Init", "two error parameters").with_help("annotate one");
        assert!(diag.is_error());
        assert_eq!(diag.help.as_deref(), Some("annotate one"));
    }

    #[test]
    fn test_levels_order_by_severity() {
        assert!(DiagnosticLevel::Error > DiagnosticLevel::Warning);
        assert_eq!(DiagnosticLevel::Warning.to_string(), "warning");
    }
}
