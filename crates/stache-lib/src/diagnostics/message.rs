use std::fmt;

use rowan::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary span drawn next to the primary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub range: TextRange,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: TextRange,
    pub message: String,
    /// The construct the problem was found in, such as the element holding
    /// an `ERROR` node.
    pub context: Option<Label>,
}

impl Diagnostic {
    pub fn error(range: TextRange, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, range, message.into())
    }

    pub fn warning(range: TextRange, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, range, message.into())
    }

    fn new(severity: Severity, range: TextRange, message: String) -> Self {
        Self {
            severity,
            range,
            message,
            context: None,
        }
    }

    pub fn with_context(mut self, range: TextRange, text: impl Into<String>) -> Self {
        self.context = Some(Label {
            range,
            text: text.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, range: TextRange) -> fmt::Result {
    write!(f, "{}..{}", u32::from(range.start()), u32::from(range.end()))
}

/// `error at 1..4: unexpected `+` (inside statement at 0..5)`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ", self.severity)?;
        write_range(f, self.range)?;
        write!(f, ": {}", self.message)?;
        if let Some(label) = &self.context {
            write!(f, " ({} at ", label.text)?;
            write_range(f, label.range)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}
