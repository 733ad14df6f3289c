mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
