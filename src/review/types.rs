use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity attached to an individual finding or recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Case-insensitive parse; anything unrecognized is treated as absent.
    pub fn parse(raw: &str) -> Option<Severity> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// The three analysis sections every review carries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Structure,
    Implementation,
    BestPractices,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Structure,
        SectionKind::Implementation,
        SectionKind::BestPractices,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Structure => "Architecture & Code Quality",
            SectionKind::Implementation => "Implementation & Performance",
            SectionKind::BestPractices => "Best Practices & Security",
        }
    }
}

/// A single observation about the submitted code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Short heading, taken from `aspect` or `issue` on the wire
    pub title: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub kind: SectionKind,
    /// Absent when the service did not score this section
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<String>,
}

/// One before/after edit from the automated correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Wire name `type`
    pub kind: String,
    pub location: String,
    pub original: String,
    pub correction: String,
    pub explanation: String,
}

/// Corrected code and its changes are only reachable when corrections exist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Corrections {
    #[default]
    None,
    Available {
        corrected_code: String,
        changes: Vec<Change>,
    },
}

impl Corrections {
    pub fn has_corrections(&self) -> bool {
        matches!(self, Corrections::Available { .. })
    }
}

/// Canonical review result, produced once at ingestion and immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub metrics: BTreeMap<String, u8>,
    pub sections: Vec<AnalysisSection>,
    pub recommendations: Vec<Recommendation>,
    pub corrections: Corrections,
}

impl ReviewResult {
    #[cfg(test)]
    pub(crate) fn section(&self, kind: SectionKind) -> Option<&AnalysisSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}
