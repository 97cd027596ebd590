// src/types/analysis.rs
//! Analysis payloads exchanged with the resume backend

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_bullet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: f64,
    #[serde(default)]
    pub missing_keywords: Vec<MissingKeyword>,
    #[serde(default)]
    pub improved_bullets: Vec<BulletImprovement>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingKeyword {
    pub keyword: String,
    pub importance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletImprovement {
    pub original: String,
    pub improved: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<u32>,
}

impl BulletImprovement {
    /// Copy with `original` and `improved` normalized; `reason` and `impact_score` untouched
    pub fn normalized(&self) -> Self {
        Self {
            original: normalize_bullet(&self.original),
            improved: normalize_bullet(&self.improved),
            reason: self.reason.clone(),
            impact_score: self.impact_score,
        }
    }
}

impl AnalysisResult {
    pub fn has_improvements(&self) -> bool {
        !self.improved_bullets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_backend_payload() {
        let json = r#"{
            "match_score": 72,
            "missing_keywords": [
                {"keyword": "Go", "importance": "high", "frequency": 2, "context": "Required skill"}
            ],
            "improved_bullets": [
                {"original": "- Built APIs", "improved": "Built Go APIs serving 1M req/day",
                 "reason": "Added impact", "impact_score": 8}
            ],
            "suggestions": ["Include quantifiable achievements"]
        }"#;

        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.match_score, 72.0);
        assert_eq!(analysis.missing_keywords[0].keyword, "Go");
        assert_eq!(analysis.missing_keywords[0].frequency, Some(2));
        assert_eq!(analysis.improved_bullets[0].impact_score, Some(8));
        assert!(analysis.has_improvements());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"match_score": 40.5, "missing_keywords": [{"keyword": "AWS", "importance": "low"}]}"#;
        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(analysis.missing_keywords[0].context.is_none());
        assert!(analysis.improved_bullets.is_empty());
        assert!(analysis.suggestions.is_empty());
        assert!(!analysis.has_improvements());
    }

    #[test]
    fn test_normalized_keeps_reason_and_score() {
        let bullet = BulletImprovement {
            original: "•  Built   APIs ".to_string(),
            improved: "- Built Go APIs".to_string(),
            reason: "  Added impact ".to_string(),
            impact_score: Some(9),
        };

        let normalized = bullet.normalized();
        assert_eq!(normalized.original, "Built APIs");
        assert_eq!(normalized.improved, "Built Go APIs");
        assert_eq!(normalized.reason, "  Added impact ");
        assert_eq!(normalized.impact_score, Some(9));
    }
}
