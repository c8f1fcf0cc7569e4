use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use super::types::{
    AnalysisSection, Change, Corrections, Finding, Recommendation, ReviewResult, SectionKind,
    Severity,
};
use super::ReviewError;

/// Keys under which a section's finding list has been observed.
const FINDING_KEYS: [&str; 3] = ["findings", "issues", "vulnerabilities"];

impl SectionKind {
    fn wire_key(self) -> &'static str {
        match self {
            SectionKind::Structure => "structureAnalysis",
            SectionKind::Implementation => "implementationReview",
            SectionKind::BestPractices => "bestPractices",
        }
    }

    /// Nested sub-object that carries the score and findings in the
    /// nested response variant.
    fn nested_key(self) -> &'static str {
        match self {
            SectionKind::Structure => "architecture",
            SectionKind::Implementation => "errorHandling",
            SectionKind::BestPractices => "security",
        }
    }
}

/// Normalize a raw response body into the canonical [`ReviewResult`].
///
/// The only hard requirement is that the body is a JSON object. Missing or
/// wrongly-typed collections become empty, and non-object entries inside
/// collections are skipped, since the response schema is known to vary.
pub fn normalize(body: Value) -> Result<ReviewResult, ReviewError> {
    let root = match body {
        Value::Object(map) => map,
        Value::Null => return Err(ReviewError::Format("response body is null".to_string())),
        other => {
            return Err(ReviewError::Format(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let metrics = root.get("metrics").map(normalize_metrics).unwrap_or_default();
    let sections = SectionKind::ALL
        .iter()
        .map(|kind| normalize_section(*kind, root.get(kind.wire_key())))
        .collect();
    let recommendations = root
        .get("recommendations")
        .map(normalize_recommendations)
        .unwrap_or_default();
    let corrections = root
        .get("corrections")
        .map(normalize_corrections)
        .unwrap_or_default();

    let result = ReviewResult {
        metrics,
        sections,
        recommendations,
        corrections,
    };
    debug!(
        metrics = result.metrics.len(),
        recommendations = result.recommendations.len(),
        has_corrections = result.corrections.has_corrections(),
        "normalized review result"
    );
    Ok(result)
}

/// Scores are rounded and clamped into [0, 100]; non-numeric values are dropped.
fn score_of(value: &Value) -> Option<u8> {
    let raw = value.as_f64()?;
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

fn normalize_metrics(value: &Value) -> BTreeMap<String, u8> {
    let Some(map) = value.as_object() else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(name, v)| score_of(v).map(|s| (name.clone(), s)))
        .collect()
}

fn normalize_section(kind: SectionKind, value: Option<&Value>) -> AnalysisSection {
    let flat = value.and_then(Value::as_object);
    let nested = flat
        .and_then(|m| m.get(kind.nested_key()))
        .and_then(Value::as_object);
    let candidates: Vec<&Map<String, Value>> = flat.into_iter().chain(nested).collect();

    let score = candidates
        .iter()
        .find_map(|m| m.get("score").and_then(score_of));
    let summary = candidates
        .iter()
        .find_map(|m| string_field(m, "explanation"));
    let findings = candidates
        .iter()
        .find_map(|m| {
            FINDING_KEYS
                .iter()
                .find_map(|key| m.get(*key).and_then(Value::as_array))
        })
        .map(|items| items.iter().filter_map(normalize_finding).collect())
        .unwrap_or_default();

    AnalysisSection {
        kind,
        score,
        summary,
        findings,
    }
}

fn normalize_finding(value: &Value) -> Option<Finding> {
    let map = value.as_object()?;
    let title = string_field(map, "aspect")
        .or_else(|| string_field(map, "issue"))
        .unwrap_or_default();
    Some(Finding {
        title,
        explanation: string_field(map, "explanation").unwrap_or_default(),
        recommendation: string_field(map, "recommendation"),
        severity: map
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::parse),
    })
}

fn normalize_recommendations(value: &Value) -> Vec<Recommendation> {
    let items = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("items").and_then(Value::as_array),
        _ => None,
    };
    items
        .map(|items| items.iter().filter_map(normalize_recommendation).collect())
        .unwrap_or_default()
}

fn normalize_recommendation(value: &Value) -> Option<Recommendation> {
    let map = value.as_object()?;
    Some(Recommendation {
        title: string_field(map, "title").unwrap_or_default(),
        description: string_field(map, "description").unwrap_or_default(),
        severity: map
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::parse),
        category: string_field(map, "category"),
    })
}

fn normalize_corrections(value: &Value) -> Corrections {
    let Some(map) = value.as_object() else {
        return Corrections::None;
    };
    if map.get("hasCorrections").and_then(Value::as_bool) != Some(true) {
        return Corrections::None;
    }
    let Some(corrected_code) = string_field(map, "correctedCode").filter(|c| !c.is_empty()) else {
        debug!("hasCorrections set without correctedCode; treating as no corrections");
        return Corrections::None;
    };
    let changes = map
        .get("changes")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_change).collect())
        .unwrap_or_default();
    Corrections::Available {
        corrected_code,
        changes,
    }
}

fn normalize_change(value: &Value) -> Option<Change> {
    let map = value.as_object()?;
    Some(Change {
        kind: string_field(map, "type").unwrap_or_default(),
        location: string_field(map, "location").unwrap_or_default(),
        original: string_field(map, "original").unwrap_or_default(),
        correction: string_field(map, "correction").unwrap_or_default(),
        explanation: string_field(map, "explanation").unwrap_or_default(),
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_bodies() {
        assert!(normalize(Value::Null).is_err());
        assert!(normalize(json!([1, 2, 3])).is_err());
        assert!(normalize(json!("ok")).is_err());
    }

    #[test]
    fn test_empty_object_normalizes_to_empty_result() {
        let result = normalize(json!({})).unwrap();
        assert!(result.metrics.is_empty());
        assert_eq!(result.sections.len(), 3);
        assert!(result.sections.iter().all(|s| s.findings.is_empty() && s.score.is_none()));
        assert!(result.recommendations.is_empty());
        assert_eq!(result.corrections, Corrections::None);
    }

    #[test]
    fn test_flat_section_variant() {
        let result = normalize(json!({
            "structureAnalysis": {
                "score": 72,
                "findings": [{ "aspect": "Naming", "explanation": "Names are short", "severity": "low" }]
            }
        }))
        .unwrap();
        let section = result.section(SectionKind::Structure).unwrap();
        assert_eq!(section.score, Some(72));
        assert_eq!(section.findings[0].title, "Naming");
        assert_eq!(section.findings[0].severity, Some(Severity::Low));
    }

    #[test]
    fn test_nested_section_variants() {
        let result = normalize(json!({
            "structureAnalysis": { "architecture": { "score": 85, "findings": [{ "aspect": "Layout", "explanation": "ok" }] } },
            "implementationReview": { "errorHandling": { "score": 55, "issues": [{ "issue": "Bare except", "explanation": "swallows errors", "recommendation": "catch specific errors" }] } },
            "bestPractices": { "security": { "score": 64, "vulnerabilities": [{ "issue": "eval", "explanation": "code injection" }], "explanation": "one risk" } }
        }))
        .unwrap();

        let implementation = result.section(SectionKind::Implementation).unwrap();
        assert_eq!(implementation.score, Some(55));
        assert_eq!(implementation.findings[0].title, "Bare except");
        assert_eq!(
            implementation.findings[0].recommendation.as_deref(),
            Some("catch specific errors")
        );

        let security = result.section(SectionKind::BestPractices).unwrap();
        assert_eq!(security.score, Some(64));
        assert_eq!(security.findings[0].title, "eval");
        assert_eq!(security.summary.as_deref(), Some("one risk"));
        assert_eq!(result.section(SectionKind::Structure).unwrap().score, Some(85));
    }

    #[test]
    fn test_recommendations_array_and_items_variants_match() {
        let item = json!({ "title": "Add tests", "description": "No tests found", "severity": "High", "category": "Quality" });
        let flat = normalize(json!({ "recommendations": [item.clone()] })).unwrap();
        let wrapped = normalize(json!({ "recommendations": { "priority": "high", "items": [item] } })).unwrap();
        assert_eq!(flat.recommendations, wrapped.recommendations);
        assert_eq!(flat.recommendations[0].severity, Some(Severity::High));
        assert_eq!(flat.recommendations[0].category.as_deref(), Some("Quality"));
    }

    #[test]
    fn test_malformed_collections_become_empty() {
        let result = normalize(json!({
            "structureAnalysis": { "score": 50, "findings": "not a list" },
            "recommendations": 7,
            "metrics": ["overall"]
        }))
        .unwrap();
        assert!(result.section(SectionKind::Structure).unwrap().findings.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.metrics.is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let result = normalize(json!({
            "recommendations": [null, "text", { "title": "Keep", "description": "d" }]
        }))
        .unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].title, "Keep");
    }

    #[test]
    fn test_metric_scores_are_clamped_and_text_dropped() {
        let result = normalize(json!({
            "metrics": { "overallScore": 72, "securityScore": 140, "qualityScore": 79.6, "explanation": "text" }
        }))
        .unwrap();
        assert_eq!(result.metrics.get("overallScore"), Some(&72));
        assert_eq!(result.metrics.get("securityScore"), Some(&100));
        assert_eq!(result.metrics.get("qualityScore"), Some(&80));
        assert!(!result.metrics.contains_key("explanation"));
    }

    #[test]
    fn test_stray_changes_ignored_without_corrections() {
        let result = normalize(json!({
            "corrections": {
                "hasCorrections": false,
                "correctedCode": "print('x')",
                "changes": [{ "type": "fix", "location": "line 1", "original": "a", "correction": "b", "explanation": "c" }]
            }
        }))
        .unwrap();
        assert_eq!(result.corrections, Corrections::None);
    }

    #[test]
    fn test_corrections_preserve_change_order() {
        let result = normalize(json!({
            "corrections": {
                "hasCorrections": true,
                "correctedCode": "def f():\n    return 1\n",
                "changes": [
                    { "type": "style", "location": "line 2", "original": "a", "correction": "b", "explanation": "second" },
                    { "type": "bug", "location": "line 1", "original": "c", "correction": "d", "explanation": "first" }
                ]
            }
        }))
        .unwrap();
        match result.corrections {
            Corrections::Available { changes, .. } => {
                assert_eq!(changes[0].location, "line 2");
                assert_eq!(changes[1].kind, "bug");
            }
            Corrections::None => panic!("expected corrections"),
        }
    }

    #[test]
    fn test_corrections_without_code_degrade_to_none() {
        let result = normalize(json!({ "corrections": { "hasCorrections": true } })).unwrap();
        assert_eq!(result.corrections, Corrections::None);
    }
}
