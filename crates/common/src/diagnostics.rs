//! Diagnostic primitives shared across analysis layers.
//!
//! Analysis passes build [`CompleteDiagnostic`] values and push them into the
//! compilation context's sink; rendering is the embedder's concern.

use std::fmt;

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// The analysis pass a diagnostic originates from. Combined with a pass-local
/// code this yields a stable, user-reportable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticPass {
    ItemLower,
    Conformance,
    Derive,
}

impl DiagnosticPass {
    fn as_str(self) -> &'static str {
        match self {
            Self::ItemLower => "item-lower",
            Self::Conformance => "conformance",
            Self::Derive => "derive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorCode {
    pub pass: DiagnosticPass,
    pub local_code: u16,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.pass.as_str(), self.local_code)
    }
}

/// A resolved source location. Items assembled programmatically (no source
/// file) carry [`Span::invalid`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: SmolStr,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: impl Into<SmolStr>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }

    pub fn invalid() -> Self {
        Self {
            file: SmolStr::default(),
            start: 0,
            end: 0,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.file.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDiagnostic {
    pub style: LabelStyle,
    pub message: String,
    pub span: Option<Span>,
}

/// A fully rendered diagnostic, independent of any compiler-internal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteDiagnostic {
    pub severity: Severity,
    pub error_code: ErrorCode,
    pub message: String,
    pub sub_diagnostics: Vec<SubDiagnostic>,
    pub notes: Vec<String>,
}

impl CompleteDiagnostic {
    pub fn new(
        severity: Severity,
        error_code: ErrorCode,
        message: String,
        sub_diagnostics: Vec<SubDiagnostic>,
        notes: Vec<String>,
    ) -> Self {
        Self {
            severity,
            error_code,
            message,
            sub_diagnostics,
            notes,
        }
    }

    /// The span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<&Span> {
        self.sub_diagnostics
            .iter()
            .find(|sub| sub.style == LabelStyle::Primary)
            .and_then(|sub| sub.span.as_ref())
    }
}
