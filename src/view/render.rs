use colored::{Color, Colorize};
use std::fmt::Write;

use super::{Pane, ResultView, SectionId, Tab};
use crate::review::{AnalysisSection, Change, Finding, Recommendation, Severity};
use crate::score;

const TABS: [Tab; 3] = [Tab::Original, Tab::Corrected, Tab::Changes];

pub fn key_help() -> &'static str {
    "[o] original  [c] corrected  [x] changes  [1-4] toggle section  [q] quit"
}

fn severity_color(severity: Severity, dark_mode: bool) -> Color {
    match (severity, dark_mode) {
        (Severity::High, false) => Color::Red,
        (Severity::High, true) => Color::BrightRed,
        (Severity::Medium, false) => Color::Yellow,
        (Severity::Medium, true) => Color::BrightYellow,
        (Severity::Low, false) => Color::Green,
        (Severity::Low, true) => Color::BrightGreen,
    }
}

/// A code fence longer than any backtick run inside `text`.
fn fence_for(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn fenced(md: &mut String, text: &str) {
    let fence = fence_for(text);
    md.push_str(&fence);
    md.push('\n');
    md.push_str(text);
    if !text.ends_with('\n') {
        md.push('\n');
    }
    md.push_str(&fence);
    md.push_str("\n\n");
}

fn marker(expanded: bool) -> &'static str {
    if expanded {
        "▾"
    } else {
        "▸"
    }
}

/// Render the whole result page for the terminal.
pub fn terminal(view: &ResultView) -> String {
    let dark = view.dark_mode();
    let accent = if dark { Color::BrightCyan } else { Color::Blue };
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "<CodeSense?> Comprehensive Review and Recommendations".bold());
    let _ = writeln!(out);

    let cards = view.metric_cards();
    if cards.is_empty() {
        let _ = writeln!(out, "  No metrics reported.");
    }
    for card in &cards {
        let _ = writeln!(
            out,
            "  {:<16} {} {} {}",
            card.label,
            score::colored_bar(card.score, dark),
            score::badge(card.score, dark),
            card.tier.label().color(card.tier.color(dark))
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "═══ {} ═══", "Code Analysis".color(accent).bold());
    let tabs: Vec<String> = TABS
        .iter()
        .map(|tab| {
            if *tab == view.active_tab() {
                format!("[{}]", tab.label()).color(accent).bold().to_string()
            } else {
                format!(" {} ", tab.label())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join("  "));
    terminal_pane(&mut out, view.pane(), dark);
    let _ = writeln!(out);

    for (index, section) in view.analysis_sections().iter().enumerate() {
        let id = SectionId::from(section.kind);
        terminal_section(&mut out, index + 1, section, view.is_expanded(id), dark, accent);
    }

    let expanded = view.is_expanded(SectionId::Recommendations);
    let _ = writeln!(
        out,
        "{} 4 ═══ {} ═══",
        marker(expanded),
        "Key Recommendations".color(accent).bold()
    );
    if expanded {
        terminal_recommendations(&mut out, view.recommendations(), dark);
    }
    let _ = writeln!(out);
    out
}

fn terminal_pane(out: &mut String, pane: Pane<'_>, dark: bool) {
    match pane {
        Pane::Source(code) => {
            // Split on '\n' only so carriage returns and a trailing blank line survive.
            for (number, line) in code.split('\n').enumerate() {
                let _ = writeln!(out, "{:>4} │ {}", (number + 1).to_string().dimmed(), line);
            }
        }
        Pane::Empty(message) => {
            let _ = writeln!(out, "  {}", message.dimmed());
        }
        Pane::Changes([]) => {
            let _ = writeln!(out, "  No individual changes listed.");
        }
        Pane::Changes(changes) => {
            for change in changes {
                terminal_change(out, change, dark);
            }
        }
    }
}

fn terminal_change(out: &mut String, change: &Change, dark: bool) {
    let removed = if dark { Color::BrightRed } else { Color::Red };
    let added = if dark { Color::BrightGreen } else { Color::Green };
    let _ = writeln!(out, "  • {} ({})", change.kind.bold(), change.location);
    let _ = writeln!(out, "    {}", "Original:".color(removed));
    for line in change.original.lines() {
        let _ = writeln!(out, "    - {}", line.color(removed));
    }
    let _ = writeln!(out, "    {}", "Correction:".color(added));
    for line in change.correction.lines() {
        let _ = writeln!(out, "    + {}", line.color(added));
    }
    let _ = writeln!(out, "    Explanation: {}", change.explanation);
}

fn terminal_section(
    out: &mut String,
    number: usize,
    section: &AnalysisSection,
    expanded: bool,
    dark: bool,
    accent: Color,
) {
    let badge = section
        .score
        .map(|s| format!(" {}", score::badge(s, dark)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{} {} ═══ {} ═══{}",
        marker(expanded),
        number,
        section.kind.title().color(accent).bold(),
        badge
    );
    if !expanded {
        return;
    }
    if let Some(summary) = &section.summary {
        let _ = writeln!(out, "  {}", summary.italic());
    }
    if section.findings.is_empty() {
        let _ = writeln!(out, "  No findings.");
    }
    for finding in &section.findings {
        terminal_finding(out, finding, dark);
    }
    let _ = writeln!(out);
}

fn terminal_finding(out: &mut String, finding: &Finding, dark: bool) {
    let tag = finding
        .severity
        .map(|s| format!(" [{}]", s.to_string().color(severity_color(s, dark))))
        .unwrap_or_default();
    let _ = writeln!(out, "  • {}{}", finding.title.bold(), tag);
    if !finding.explanation.is_empty() {
        let _ = writeln!(out, "    {}", finding.explanation);
    }
    if let Some(recommendation) = &finding.recommendation {
        let _ = writeln!(out, "    Recommendation: {}", recommendation);
    }
}

fn terminal_recommendations(out: &mut String, items: &[Recommendation], dark: bool) {
    if items.is_empty() {
        let _ = writeln!(out, "  No recommendations.");
    }
    for item in items {
        let mut head = String::new();
        if let Some(s) = item.severity {
            let _ = write!(head, "[{}] ", s.to_string().color(severity_color(s, dark)));
        }
        if let Some(category) = &item.category {
            let _ = write!(head, "{} ", category);
        }
        let _ = writeln!(out, "  {}{}", head, item.title.bold());
        if !item.description.is_empty() {
            let _ = writeln!(out, "    {}", item.description);
        }
    }
}

/// Render the result page as markdown. Collapsed sections keep their heading
/// and score only.
pub fn markdown(view: &ResultView) -> String {
    let mut md = String::new();
    md.push_str("# CodeSense Review\n\n");

    md.push_str("## Metrics\n\n");
    let cards = view.metric_cards();
    if cards.is_empty() {
        md.push_str("No metrics reported.\n\n");
    } else {
        md.push_str("| Metric | Score | Tier |\n|---|---|---|\n");
        for card in &cards {
            let _ = writeln!(md, "| {} | {}/100 | {} |", card.label, card.score, card.tier);
        }
        md.push('\n');
    }

    let _ = writeln!(md, "## Code Analysis: {}\n", view.active_tab().label());
    match view.pane() {
        Pane::Source(code) => fenced(&mut md, code),
        Pane::Empty(message) => {
            let _ = writeln!(md, "_{}_\n", message);
        }
        Pane::Changes(changes) => {
            if changes.is_empty() {
                md.push_str("No individual changes listed.\n\n");
            }
            for change in changes {
                let _ = writeln!(md, "### {} ({})\n", change.kind, change.location);
                md.push_str("Original:\n\n");
                fenced(&mut md, &change.original);
                md.push_str("Correction:\n\n");
                fenced(&mut md, &change.correction);
                let _ = writeln!(md, "**Explanation:** {}\n", change.explanation);
            }
        }
    }

    for section in view.analysis_sections() {
        match section.score {
            Some(s) => {
                let _ = writeln!(
                    md,
                    "## {} ({}/100, {})\n",
                    section.kind.title(),
                    s,
                    score::classify(s)
                );
            }
            None => {
                let _ = writeln!(md, "## {}\n", section.kind.title());
            }
        }
        if !view.is_expanded(SectionId::from(section.kind)) {
            continue;
        }
        if let Some(summary) = &section.summary {
            let _ = writeln!(md, "_{}_\n", summary);
        }
        if section.findings.is_empty() {
            md.push_str("No findings.\n\n");
            continue;
        }
        for finding in &section.findings {
            let tag = finding
                .severity
                .map(|s| format!("**[{}]** ", s))
                .unwrap_or_default();
            let _ = write!(md, "- {}**{}**: {}", tag, finding.title, finding.explanation);
            if let Some(recommendation) = &finding.recommendation {
                let _ = write!(md, " _Recommendation:_ {}", recommendation);
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md.push_str("## Key Recommendations\n\n");
    if view.is_expanded(SectionId::Recommendations) {
        if view.recommendations().is_empty() {
            md.push_str("No recommendations.\n");
        }
        for item in view.recommendations() {
            let category = item
                .category
                .as_deref()
                .map(|c| format!(" ({})", c))
                .unwrap_or_default();
            let tag = item
                .severity
                .map(|s| format!("**[{}]** ", s))
                .unwrap_or_default();
            let _ = writeln!(md, "- {}{}{}: {}", tag, item.title, category, item.description);
        }
    }
    md
}
