use crate::source_map::Range;

pub const W_TAG_DISALLOWED: &str = "W_TAG_DISALLOWED";
pub const W_URL_REJECTED: &str = "W_URL_REJECTED";
pub const W_SCRIPT_NEUTRALIZED: &str = "W_SCRIPT_NEUTRALIZED";

pub const I_TAG_UNCLOSED: &str = "I_TAG_UNCLOSED";
pub const I_END_TAG_STRAY: &str = "I_END_TAG_STRAY";
pub const I_TAG_INCOMPLETE: &str = "I_TAG_INCOMPLETE";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        range: Range,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            code,
            message: message.into(),
        }
    }
}

/// `Warning`: user content was neutralized. `Info`: the markup was repaired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticSeverity {
    Warning,
    Info,
}

impl DiagnosticSeverity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}
