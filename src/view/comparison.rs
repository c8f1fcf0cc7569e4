use clap::ValueEnum;

use crate::review::{Change, Corrections};

pub const NO_CORRECTIONS: &str = "No code corrections available";

/// Which representation of the code is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Tab {
    #[default]
    Original,
    Corrected,
    Changes,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Original => "Original Code",
            Tab::Corrected => "Corrected Code",
            Tab::Changes => "Changes",
        }
    }
}

/// What the active tab renders.
#[derive(Debug, PartialEq)]
pub enum Pane<'a> {
    /// Code shown verbatim
    Source(&'a str),
    /// Changes in the order they were received
    Changes(&'a [Change]),
    Empty(&'static str),
}

/// Tri-state viewer over the original code, the corrected code and the list
/// of changes. Selecting a tab only moves the state; the result itself is
/// borrowed immutably when rendering.
#[derive(Debug, Clone, Default)]
pub struct CodeComparisonViewer {
    active: Tab,
}

impl CodeComparisonViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn pane<'a>(&self, original: &'a str, corrections: &'a Corrections) -> Pane<'a> {
        match (self.active, corrections) {
            (Tab::Original, _) => Pane::Source(original),
            (_, Corrections::None) => Pane::Empty(NO_CORRECTIONS),
            (Tab::Corrected, Corrections::Available { corrected_code, .. }) => {
                Pane::Source(corrected_code)
            }
            (Tab::Changes, Corrections::Available { changes, .. }) => Pane::Changes(changes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Corrections {
        Corrections::Available {
            corrected_code: "def f():\n    pass\n".to_string(),
            changes: vec![
                Change {
                    kind: "style".to_string(),
                    location: "line 1".to_string(),
                    original: "def f(): pass".to_string(),
                    correction: "def f():\n    pass".to_string(),
                    explanation: "split".to_string(),
                },
                Change {
                    kind: "docs".to_string(),
                    location: "line 2".to_string(),
                    original: String::new(),
                    correction: "\"\"\"doc\"\"\"".to_string(),
                    explanation: "document".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_starts_on_original() {
        let viewer = CodeComparisonViewer::new();
        assert_eq!(viewer.active(), Tab::Original);
        assert_eq!(viewer.pane("def f(): pass", &available()), Pane::Source("def f(): pass"));
    }

    #[test]
    fn test_original_is_verbatim() {
        let code = "  \tdef f():\r\n\n  pass  ";
        let viewer = CodeComparisonViewer::new();
        assert_eq!(viewer.pane(code, &Corrections::None), Pane::Source(code));
    }

    #[test]
    fn test_corrected_and_changes_panes() {
        let corrections = available();
        let mut viewer = CodeComparisonViewer::new();

        viewer.select(Tab::Corrected);
        assert_eq!(viewer.pane("x", &corrections), Pane::Source("def f():\n    pass\n"));

        viewer.select(Tab::Changes);
        match viewer.pane("x", &corrections) {
            Pane::Changes(changes) => {
                assert_eq!(changes.len(), 2);
                assert_eq!(changes[0].location, "line 1");
                assert_eq!(changes[1].location, "line 2");
            }
            other => panic!("expected changes, got {:?}", other),
        }
    }

    #[test]
    fn test_without_corrections_shows_empty_state() {
        let mut viewer = CodeComparisonViewer::new();
        for tab in [Tab::Corrected, Tab::Changes] {
            viewer.select(tab);
            assert_eq!(viewer.pane("x", &Corrections::None), Pane::Empty(NO_CORRECTIONS));
        }
    }

    #[test]
    fn test_transitions_are_reversible() {
        let corrections = available();
        let mut viewer = CodeComparisonViewer::new();
        viewer.select(Tab::Changes);
        viewer.select(Tab::Original);
        assert_eq!(viewer.pane("src", &corrections), Pane::Source("src"));
        viewer.select(Tab::Corrected);
        viewer.select(Tab::Corrected);
        assert_eq!(viewer.active(), Tab::Corrected);
        assert_eq!(corrections, available());
    }
}
