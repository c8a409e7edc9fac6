//! Diagnostics - the run-wide error log
//!
//! Checks record diagnostics and keep going.
//! The run decides at the end what a non-empty log means.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CompileError;
use crate::shape::Side;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingField,
    AmbiguousVariant,
    IncoherentGroup,
    UnresolvedReference,
    MissingResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Prototype, definition or resource the diagnostic is about.
    pub subject: String,
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn missing_field(subject: &str, field: &str, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(r) => format!("missing required field `{}` (required by `{}`)", field, r),
            None => format!("missing required field `{}`", field),
        };
        Self {
            kind: DiagnosticKind::MissingField,
            subject: subject.to_string(),
            fields: vec![field.to_string()],
            reference: None,
            reason: reason.map(str::to_string),
            message,
        }
    }

    pub fn ambiguous_variant(subject: &str, candidates: &[&str], set_count: usize) -> Self {
        let message = if set_count == 0 {
            format!("exactly one of {} must be set, found none", candidates.join(", "))
        } else {
            format!(
                "exactly one of {} must be set, found {}",
                candidates.join(", "),
                set_count
            )
        };
        Self {
            kind: DiagnosticKind::AmbiguousVariant,
            subject: subject.to_string(),
            fields: candidates.iter().map(|f| f.to_string()).collect(),
            reference: None,
            reason: None,
            message,
        }
    }

    pub fn incoherent_group(subject: &str, set: &[&str], unset: &[&str]) -> Self {
        Self {
            kind: DiagnosticKind::IncoherentGroup,
            subject: subject.to_string(),
            fields: set.iter().chain(unset).map(|f| f.to_string()).collect(),
            reference: None,
            reason: None,
            message: format!(
                "field group is partially set: {} set, {} missing",
                set.join(", "),
                unset.join(", ")
            ),
        }
    }

    pub fn unresolved_reference(subject: &str, side: Side, name: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedReference,
            subject: subject.to_string(),
            fields: vec![side.to_string()],
            reference: Some(name.to_string()),
            reason: None,
            message: format!("side `{}`: no such tile `{}`", side, name),
        }
    }

    pub fn missing_resource(family: &str, file: &str) -> Self {
        Self {
            kind: DiagnosticKind::MissingResource,
            subject: format!("{}/{}", family, file),
            fields: vec![],
            reference: Some(file.to_string()),
            reason: None,
            message: format!("resource `{}` not found in family `{}`", file, family),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Ordered, append-only diagnostics log for one compilation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = ?diagnostic.kind,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Drain the log. A non-empty log fails the run with every entry.
    pub fn finish(self) -> Result<(), CompileError> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(CompileError::Diagnostics(self.entries))
        }
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_order() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::missing_field("a", "image", None));
        diags.push(Diagnostic::missing_field("b", "model", None));
        let subjects: Vec<_> = diags.iter().map(|d| d.subject.as_str()).collect();
        assert_eq!(subjects, vec!["a", "b"]);
    }

    #[test]
    fn test_finish_surfaces_everything() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::missing_field("a", "image", None));
        diags.push(Diagnostic::unresolved_reference("b", Side::North, "stone"));
        match diags.finish() {
            Err(CompileError::Diagnostics(all)) => assert_eq!(all.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Diagnostics::new().finish().is_ok());
    }

    #[test]
    fn test_reason_in_message() {
        let d = Diagnostic::missing_field("door", "anim_framerate", Some("anim_frames"));
        assert!(d.message.contains("anim_frames"));
        assert_eq!(d.reason.as_deref(), Some("anim_frames"));
    }
}
