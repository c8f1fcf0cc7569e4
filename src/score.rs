use colored::{Color, ColoredString, Colorize};

/// Severity tier derived from a numeric score.
///
/// Every score shown anywhere (metric cards, section badges, progress bars,
/// markdown output) is classified through [`classify`]; no other module
/// compares scores against thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Critical,
    Warning,
    Healthy,
}

const HEALTHY_FLOOR: u8 = 80;
const WARNING_FLOOR: u8 = 60;
const BAR_WIDTH: usize = 20;

/// Map a score to its tier: >= 80 Healthy, 60..80 Warning, < 60 Critical.
pub fn classify(score: u8) -> Tier {
    if score >= HEALTHY_FLOOR {
        Tier::Healthy
    } else if score >= WARNING_FLOOR {
        Tier::Warning
    } else {
        Tier::Critical
    }
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Healthy => "HEALTHY",
            Tier::Warning => "WARNING",
            Tier::Critical => "CRITICAL",
        }
    }

    /// Terminal color for this tier. Dark mode uses the bright palette.
    pub fn color(self, dark_mode: bool) -> Color {
        match (self, dark_mode) {
            (Tier::Healthy, false) => Color::Green,
            (Tier::Healthy, true) => Color::BrightGreen,
            (Tier::Warning, false) => Color::Yellow,
            (Tier::Warning, true) => Color::BrightYellow,
            (Tier::Critical, false) => Color::Red,
            (Tier::Critical, true) => Color::BrightRed,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `72/100` colored by tier.
pub fn badge(score: u8, dark_mode: bool) -> ColoredString {
    format!("{}/100", score)
        .color(classify(score).color(dark_mode))
        .bold()
}

/// Fixed-width progress bar, filled proportionally to the score.
pub fn bar(score: u8) -> String {
    let filled = (usize::from(score.min(100)) * BAR_WIDTH + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn colored_bar(score: u8, dark_mode: bool) -> ColoredString {
    bar(score).color(classify(score).color(dark_mode))
}
