pub mod comparison;
pub mod render;
pub mod sections;

pub use comparison::{CodeComparisonViewer, Pane, Tab};
pub use sections::{SectionExpansion, SectionId};

use std::io::{BufRead, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::review::{AnalysisSection, Recommendation, ReviewResult};
use crate::score::{self, Tier};
use crate::store::ReviewStore;
use crate::submit::View;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of mounting the result view.
#[derive(Debug)]
pub enum Mount {
    Ready(Box<ResultView>),
    /// Nothing usable was stored; go back to this view.
    Redirect(View),
}

/// Known metrics, in dashboard order.
const KNOWN_METRICS: [(&str, &str); 5] = [
    ("overallScore", "Overall"),
    ("qualityScore", "Quality"),
    ("securityScore", "Security"),
    ("performanceScore", "Performance"),
    ("maintainabilityScore", "Maintainability"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: String,
    pub score: u8,
    pub tier: Tier,
}

/// The result page: the stored review plus view-local tab and section state.
#[derive(Debug)]
pub struct ResultView {
    code: String,
    result: ReviewResult,
    comparison: CodeComparisonViewer,
    sections: SectionExpansion,
    dark_mode: bool,
}

impl ResultView {
    /// Load the stored review. Integrity failures redirect to the input view
    /// instead of rendering a partial result.
    #[instrument(skip_all)]
    pub fn open(store: &ReviewStore) -> Mount {
        match store.load() {
            Ok((code, result)) => {
                debug!(code_bytes = code.len(), "mounted result view");
                Mount::Ready(Box::new(Self::new(code, result, store.dark_mode())))
            }
            Err(e) => {
                warn!(error = %e, "no usable review; redirecting to input");
                Mount::Redirect(View::Input)
            }
        }
    }

    pub fn new(code: String, result: ReviewResult, dark_mode: bool) -> Self {
        Self {
            code,
            result,
            comparison: CodeComparisonViewer::new(),
            sections: SectionExpansion::default(),
            dark_mode,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn result(&self) -> &ReviewResult {
        &self.result
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn active_tab(&self) -> Tab {
        self.comparison.active()
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.comparison.select(tab);
    }

    pub fn pane(&self) -> Pane<'_> {
        self.comparison.pane(&self.code, &self.result.corrections)
    }

    pub fn toggle_section(&mut self, id: SectionId) -> bool {
        self.sections.toggle(id)
    }

    pub fn is_expanded(&self, id: SectionId) -> bool {
        self.sections.is_expanded(id)
    }

    pub fn analysis_sections(&self) -> &[AnalysisSection] {
        &self.result.sections
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.result.recommendations
    }

    /// Metric cards: known metrics first in dashboard order, the rest by name.
    pub fn metric_cards(&self) -> Vec<MetricCard> {
        let rank = |name: &str| {
            KNOWN_METRICS
                .iter()
                .position(|(key, _)| *key == name)
                .unwrap_or(KNOWN_METRICS.len())
        };
        let mut entries: Vec<(&String, &u8)> = self.result.metrics.iter().collect();
        entries.sort_by(|a, b| rank(a.0).cmp(&rank(b.0)).then_with(|| a.0.cmp(b.0)));
        entries
            .into_iter()
            .map(|(name, score)| MetricCard {
                label: metric_label(name),
                score: *score,
                tier: score::classify(*score),
            })
            .collect()
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), ViewError> {
        std::fs::write(path, render::markdown(self))?;
        Ok(())
    }

    /// Line-driven loop: `o`/`c`/`x` pick a tab, `1`-`4` toggle a section,
    /// `q` leaves. The view is re-rendered after every accepted command.
    pub fn run_interactive(
        &mut self,
        input: impl BufRead,
        mut out: impl Write,
    ) -> Result<(), ViewError> {
        write!(out, "{}", render::terminal(self))?;
        writeln!(out, "{}", render::key_help())?;
        for line in input.lines() {
            let line = line?;
            match line.trim() {
                "q" | "quit" => break,
                "o" => self.select_tab(Tab::Original),
                "c" => self.select_tab(Tab::Corrected),
                "x" => self.select_tab(Tab::Changes),
                digit @ ("1" | "2" | "3" | "4") => {
                    let index = digit.parse::<usize>().unwrap_or(1) - 1;
                    self.toggle_section(SectionId::ALL[index]);
                }
                "" => continue,
                other => {
                    writeln!(out, "Unknown command: {}", other)?;
                    writeln!(out, "{}", render::key_help())?;
                    continue;
                }
            }
            write!(out, "{}", render::terminal(self))?;
            writeln!(out, "{}", render::key_help())?;
        }
        Ok(())
    }
}

/// `overallScore` -> `Overall`, `codeSmells` -> `Code Smells`.
fn metric_label(name: &str) -> String {
    if let Some((_, label)) = KNOWN_METRICS.iter().find(|(key, _)| *key == name) {
        return label.to_string();
    }
    let base = name.strip_suffix("Score").filter(|b| !b.is_empty()).unwrap_or(name);
    let mut label = String::new();
    for (i, ch) in base.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.push(ch);
        } else if ch == '_' {
            label.push(' ');
        } else {
            label.push(ch);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;
    use crate::review::{normalize, SectionKind};
    use crate::submit::tests::{controller_with, StubBackend};
    use crate::submit::SubmitOutcome;
    use serde_json::json;
    use std::sync::Arc;

    fn sample_view() -> ResultView {
        let result = normalize(json!({
            "metrics": { "maintainabilityScore": 55, "overallScore": 85, "codeSmells": 61 },
            "structureAnalysis": { "score": 90, "findings": [{ "aspect": "Layout", "explanation": "clear" }] },
            "recommendations": [{ "title": "Add docs", "description": "none", "severity": "high" }]
        }))
        .unwrap();
        ResultView::new("def f(): pass".to_string(), result, false)
    }

    #[test]
    fn test_open_without_saved_review_redirects() {
        let store = ReviewStore::in_memory();
        assert!(matches!(ResultView::open(&store), Mount::Redirect(View::Input)));
    }

    #[test]
    fn test_metric_cards_ordering_and_tiers() {
        let cards = sample_view().metric_cards();
        let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Overall", "Maintainability", "Code Smells"]);
        assert_eq!(cards[0].tier, Tier::Healthy);
        assert_eq!(cards[1].tier, Tier::Critical);
        assert_eq!(cards[2].tier, Tier::Warning);
    }

    #[test]
    fn test_metric_label() {
        assert_eq!(metric_label("overall"), "Overall");
        assert_eq!(metric_label("testCoverageScore"), "Test Coverage");
        assert_eq!(metric_label("Score"), "Score");
        assert_eq!(metric_label("code_smells"), "Code smells");
    }

    #[test]
    fn test_tab_switching_does_not_touch_result() {
        let mut view = sample_view();
        let before = view.result().clone();
        view.select_tab(Tab::Changes);
        assert_eq!(view.pane(), Pane::Empty(comparison::NO_CORRECTIONS));
        view.select_tab(Tab::Original);
        assert_eq!(view.pane(), Pane::Source("def f(): pass"));
        assert_eq!(view.result(), &before);
    }

    #[test]
    fn test_interactive_commands_drive_state() {
        let mut view = sample_view();
        let input = "x\n1\n4\nzzz\nq\nc\n";
        let mut out = Vec::new();
        view.run_interactive(input.as_bytes(), &mut out).unwrap();

        assert_eq!(view.active_tab(), Tab::Changes);
        assert!(!view.is_expanded(SectionId::Structure));
        assert!(!view.is_expanded(SectionId::Recommendations));
        assert!(view.is_expanded(SectionId::Implementation));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Unknown command: zzz"));
    }

    #[tokio::test]
    async fn test_submit_then_view_scenario() {
        let backend = Arc::new(StubBackend::replying(|| {
            Ok(json!({
                "metrics": { "overall": 72 },
                "structureAnalysis": { "score": 72, "findings": [] },
                "corrections": { "hasCorrections": false }
            }))
        }));
        let (controller, store, _tx) = controller_with(backend, HealthStatus::Up);

        let outcome = controller.submit("def f(): pass").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Navigate(View::Result));

        let mut view = match ResultView::open(&store) {
            Mount::Ready(view) => view,
            Mount::Redirect(_) => panic!("expected the stored review"),
        };
        let cards = view.metric_cards();
        assert_eq!(cards[0].label, "Overall");
        assert_eq!(cards[0].tier, Tier::Warning);
        assert_eq!(
            view.result().section(SectionKind::Structure).and_then(|s| s.score),
            Some(72)
        );

        assert_eq!(view.pane(), Pane::Source("def f(): pass"));
        view.select_tab(Tab::Corrected);
        assert_eq!(view.pane(), Pane::Empty(comparison::NO_CORRECTIONS));
        assert!(render::terminal(&view).contains(comparison::NO_CORRECTIONS));
    }
}
