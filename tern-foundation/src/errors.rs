//! Types for error reporting.
//!
//! Pipeline stages build [`Diagnostic`]s out of their structured errors; the
//! driver renders them to stderr through `codespan-reporting`.

use std::ops::Range;

use codespan_reporting::{
    files::SimpleFile,
    term,
    term::termcolor::{ColorChoice, StandardStream},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelStyle {
    /// Labels that describe the primary cause of a diagnostic.
    Primary,
    /// Labels that provide additional context for a diagnostic.
    Secondary,
}

/// Labels attach information about where in the code an error occurred.
#[derive(Debug, Clone)]
pub struct Label {
    pub style: LabelStyle,
    /// The byte range of source text this label labels.
    pub range: Range<usize>,
    pub message: String,
}

impl Label {
    /// Creates a primary label placed at the given range, with the given message.
    pub fn primary(range: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            style: LabelStyle::Primary,
            range,
            message: message.into(),
        }
    }

    /// Creates a secondary label placed at the given range, with the given message.
    pub fn secondary(range: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            style: LabelStyle::Secondary,
            range,
            message: message.into(),
        }
    }
}

/// Diagnostic severity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Help,
    Note,
    Warning,
    Error,
    /// An unexpected bug.
    Bug,
}

/// Diagnostic describing a problem encountered within the code.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    /// Additional notes providing context, shown below the source excerpt.
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: vec![],
            notes: vec![],
        }
    }

    /// Creates a new bug-level diagnostic.
    ///
    /// Unlike the other severities this accepts anything that can be
    /// [`Display`][std::fmt::Display]ed, since the message often comes from
    /// an unhandled error value.
    pub fn bug(error: impl ToString) -> Self {
        Self::new(Severity::Bug, error.to_string())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn to_codespan(&self) -> codespan_reporting::diagnostic::Diagnostic<()> {
        codespan_reporting::diagnostic::Diagnostic {
            severity: match self.severity {
                Severity::Help => codespan_reporting::diagnostic::Severity::Help,
                Severity::Note => codespan_reporting::diagnostic::Severity::Note,
                Severity::Warning => codespan_reporting::diagnostic::Severity::Warning,
                Severity::Error => codespan_reporting::diagnostic::Severity::Error,
                Severity::Bug => codespan_reporting::diagnostic::Severity::Bug,
            },
            code: self.code.clone(),
            message: self.message.clone(),
            labels: self
                .labels
                .iter()
                .map(|label| codespan_reporting::diagnostic::Label {
                    style: match label.style {
                        LabelStyle::Primary => codespan_reporting::diagnostic::LabelStyle::Primary,
                        LabelStyle::Secondary => {
                            codespan_reporting::diagnostic::LabelStyle::Secondary
                        }
                    },
                    file_id: (),
                    range: label.range.clone(),
                    message: label.message.clone(),
                })
                .collect(),
            notes: self.notes.clone(),
        }
    }

    /// Emits the diagnostic to standard error, rendering the labelled ranges
    /// against `source`.
    pub fn emit_to_stderr(
        &self,
        filename: &str,
        source: &str,
    ) -> Result<(), codespan_reporting::files::Error> {
        let file = SimpleFile::new(filename, source);
        term::emit(
            &mut StandardStream::stderr(ColorChoice::Auto),
            &term::Config::default(),
            &file,
            &self.to_codespan(),
        )
    }
}
