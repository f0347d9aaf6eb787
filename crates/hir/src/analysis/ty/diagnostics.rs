//! Diagnostics produced by conformance derivation.

use common::diagnostics::{
    CompleteDiagnostic, DiagnosticPass, ErrorCode, LabelStyle, Severity, Span, SubDiagnostic,
};

use crate::db::HirDb;
use crate::hir_def::IdentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveDiag {
    /// A requirement reached the deriver that the elementwise protocol does
    /// not declare. This indicates a broken protocol definition, not a user
    /// error.
    BrokenProtocolRequirement { span: Span, name: IdentId },
}

impl DeriveDiag {
    fn local_code(&self) -> u16 {
        match self {
            Self::BrokenProtocolRequirement { .. } => 1,
        }
    }

    pub fn to_complete(&self, db: &HirDb) -> CompleteDiagnostic {
        match self {
            Self::BrokenProtocolRequirement { span, name } => CompleteDiagnostic::new(
                Severity::Error,
                ErrorCode {
                    pass: DiagnosticPass::Derive,
                    local_code: self.local_code(),
                },
                format!(
                    "elementwise protocol is broken: unexpected requirement `{}`",
                    name.data(db)
                ),
                vec![SubDiagnostic {
                    style: LabelStyle::Primary,
                    message: "requirement cannot be derived".into(),
                    span: Some(span.clone()),
                }],
                vec![],
            ),
        }
    }
}
