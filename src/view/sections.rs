use clap::ValueEnum;
use std::collections::HashMap;

use crate::review::SectionKind;

/// Collapsible groups on the result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SectionId {
    Structure,
    Implementation,
    #[value(name = "best-practices", alias = "bestPractices")]
    BestPractices,
    Recommendations,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [
        SectionId::Structure,
        SectionId::Implementation,
        SectionId::BestPractices,
        SectionId::Recommendations,
    ];
}

impl From<SectionKind> for SectionId {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Structure => SectionId::Structure,
            SectionKind::Implementation => SectionId::Implementation,
            SectionKind::BestPractices => SectionId::BestPractices,
        }
    }
}

/// Expanded/collapsed flags per section. View-local: a fresh view starts
/// from the default again.
#[derive(Debug, Clone)]
pub struct SectionExpansion {
    expanded: HashMap<SectionId, bool>,
    default: bool,
}

impl Default for SectionExpansion {
    fn default() -> Self {
        Self::with_default(true)
    }
}

impl SectionExpansion {
    pub fn with_default(expanded: bool) -> Self {
        Self {
            expanded: HashMap::new(),
            default: expanded,
        }
    }

    pub fn is_expanded(&self, id: SectionId) -> bool {
        self.expanded.get(&id).copied().unwrap_or(self.default)
    }

    /// Flip one section and return its new state.
    pub fn toggle(&mut self, id: SectionId) -> bool {
        let next = !self.is_expanded(id);
        self.expanded.insert(id, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_start_expanded() {
        let sections = SectionExpansion::default();
        assert!(SectionId::ALL.iter().all(|id| sections.is_expanded(*id)));
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let mut sections = SectionExpansion::default();
        assert!(!sections.toggle(SectionId::Structure));
        assert!(!sections.is_expanded(SectionId::Structure));
        assert!(sections.is_expanded(SectionId::Implementation));

        assert!(!sections.toggle(SectionId::Implementation));
        assert!(!sections.is_expanded(SectionId::Structure));
        assert!(sections.is_expanded(SectionId::BestPractices));
        assert!(sections.is_expanded(SectionId::Recommendations));

        assert!(sections.toggle(SectionId::Structure));
        assert!(!sections.is_expanded(SectionId::Implementation));
    }

    #[test]
    fn test_custom_default() {
        let mut sections = SectionExpansion::with_default(false);
        assert!(!sections.is_expanded(SectionId::Recommendations));
        assert!(sections.toggle(SectionId::Recommendations));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(SectionId::from(SectionKind::Structure), SectionId::Structure);
    }
}
