pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::{
    AnalysisSection, Change, Corrections, Finding, Recommendation, ReviewResult, SectionKind,
    Severity,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Unexpected review format: {0}")]
    Format(String),

    #[error("Score out of range for {field}: {score}")]
    ScoreOutOfRange { field: String, score: u8 },
}

/// Check the invariants a stored result must hold: every score in [0, 100]
/// and exactly the three analysis sections.
pub fn validate(result: &ReviewResult) -> Result<(), ReviewError> {
    for (name, score) in &result.metrics {
        if *score > 100 {
            return Err(ReviewError::ScoreOutOfRange {
                field: name.clone(),
                score: *score,
            });
        }
    }
    for section in &result.sections {
        if let Some(score) = section.score.filter(|s| *s > 100) {
            return Err(ReviewError::ScoreOutOfRange {
                field: section.kind.title().to_string(),
                score,
            });
        }
    }
    let kinds: Vec<SectionKind> = result.sections.iter().map(|s| s.kind).collect();
    if kinds != SectionKind::ALL {
        return Err(ReviewError::Format(format!(
            "expected sections {:?}, found {:?}",
            SectionKind::ALL,
            kinds
        )));
    }
    Ok(())
}
