//! Field slots and the checks run over them at instantiation.
//!
//! Every check reports into [`Diagnostics`] and returns something usable,
//! so a prototype with several problems reports all of them in one pass.

use crate::diagnostics::{Diagnostic, Diagnostics};

/// One named attribute of a prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Unset,
    Set(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Unset
    }
}

impl<T> Slot<T> {
    pub fn set(&mut self, value: T) {
        *self = Slot::Set(value);
    }

    pub fn clear(&mut self) {
        *self = Slot::Unset;
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Set(v) => Some(v),
            Slot::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Slot::Unset, Slot::Set)
    }
}

/// Validation context for one prototype.
pub struct Checker<'a> {
    subject: &'a str,
    diags: &'a mut Diagnostics,
    errors: usize,
}

impl<'a> Checker<'a> {
    pub fn new(subject: &'a str, diags: &'a mut Diagnostics) -> Self {
        Self { subject, diags, errors: 0 }
    }

    pub fn subject(&self) -> &str {
        self.subject
    }

    /// Whether any check on this prototype reported a problem.
    pub fn failed(&self) -> bool {
        self.errors > 0
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.errors += 1;
        self.diags.push(diagnostic);
    }

    /// Value if set, else `default`, else a missing-field diagnostic.
    /// `reason` names the field whose presence made this one required.
    pub fn require_with<T: Clone>(
        &mut self,
        field: &str,
        slot: &Slot<T>,
        default: Option<T>,
        reason: Option<&str>,
    ) -> Option<T> {
        if let Some(v) = slot.get() {
            return Some(v.clone());
        }
        if default.is_some() {
            return default;
        }
        self.report(Diagnostic::missing_field(self.subject, field, reason));
        None
    }

    pub fn require<T: Clone>(&mut self, field: &str, slot: &Slot<T>) -> Option<T> {
        self.require_with(field, slot, None, None)
    }

    pub fn require_or<T: Clone>(&mut self, field: &str, slot: &Slot<T>, default: T) -> T {
        match slot.get() {
            Some(v) => v.clone(),
            None => {
                tracing::trace!(subject = self.subject, field, "using default");
                default
            }
        }
    }

    pub fn require_because<T: Clone>(&mut self, field: &str, slot: &Slot<T>, reason: &str) -> Option<T> {
        self.require_with(field, slot, None, Some(reason))
    }

    /// Exactly one candidate must be set. Returns its index.
    pub fn require_one(&mut self, candidates: &[(&str, bool)]) -> Option<usize> {
        let set: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, (_, is_set))| *is_set)
            .map(|(i, _)| i)
            .collect();

        if set.len() == 1 {
            return Some(set[0]);
        }

        let names: Vec<&str> = candidates.iter().map(|(n, _)| *n).collect();
        self.report(Diagnostic::ambiguous_variant(self.subject, &names, set.len()));
        None
    }

    /// All members set or none. `Some(true)` when complete, `Some(false)`
    /// when entirely absent, `None` (after a diagnostic) when partial.
    pub fn check_group(&mut self, members: &[(&str, bool)]) -> Option<bool> {
        let (set, unset): (Vec<_>, Vec<_>) = members.iter().partition(|(_, is_set)| *is_set);
        if unset.is_empty() {
            return Some(true);
        }
        if set.is_empty() {
            return Some(false);
        }

        let set: Vec<&str> = set.iter().map(|(n, _)| *n).collect();
        let unset: Vec<&str> = unset.iter().map(|(n, _)| *n).collect();
        self.report(Diagnostic::incoherent_group(self.subject, &set, &unset));
        None
    }

    /// Typed three-member group.
    pub fn group3<A: Clone, B: Clone, C: Clone>(
        &mut self,
        names: [&str; 3],
        slots: (&Slot<A>, &Slot<B>, &Slot<C>),
    ) -> (Option<A>, Option<B>, Option<C>) {
        let (a, b, c) = slots;
        let members = [
            (names[0], a.is_set()),
            (names[1], b.is_set()),
            (names[2], c.is_set()),
        ];
        match self.check_group(&members) {
            Some(true) => (a.get().cloned(), b.get().cloned(), c.get().cloned()),
            _ => (None, None, None),
        }
    }
}
