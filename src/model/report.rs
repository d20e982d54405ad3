//! Terminal analysis artifacts: damage reports and their records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity label derived from either a damage percentage or a service score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Records which mapping produced the severity label, so re-derivation
/// from the stored inputs is idempotent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBasis {
    /// Thresholds over damage_percentage: high >= 50, medium >= 25
    Percentage,
    /// Thresholds over the structured service's 0-10 score: high >= 7.0, medium >= 4.0
    ServiceScore,
}

/// Which tier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Structured,
    NarrativeVision,
    Synthetic,
}

/// Axis-aligned region within the analyzed image pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One typed damage observation (building, road, flood, or vegetation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DamageRecord {
    /// Stable id within its category array
    pub id: u32,
    pub region: BoundingRegion,
    /// Severity/category label, e.g. "severe", "minor", "submerged"
    pub label: String,
    /// Always set; keyword-only matches carry a fixed conservative value
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The terminal artifact of one analysis request.
///
/// Immutable once produced. Superseded results are discarded, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub id: String,
    /// Always within [0, 100]
    pub damage_percentage: f32,
    pub severity: Severity,
    pub severity_basis: SeverityBasis,
    /// Deduplicated, at most 5, ordered by discovery
    pub affected_areas: Vec<String>,
    pub building_damage: Vec<DamageRecord>,
    pub road_damage: Vec<DamageRecord>,
    pub flooded_areas: Vec<DamageRecord>,
    pub vegetation_loss: Vec<DamageRecord>,
    /// At most 5 human-readable action strings
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub source: AnalysisSource,
}

impl AnalysisResult {
    /// Total damage records across all categories
    pub fn record_count(&self) -> usize {
        self.building_damage.len()
            + self.road_damage.len()
            + self.flooded_areas.len()
            + self.vegetation_loss.len()
    }
}

/// Severity from damage percentage: high >= 50, medium >= 25, low otherwise
pub fn severity_from_percentage(percentage: f32) -> Severity {
    if percentage >= 50.0 {
        Severity::High
    } else if percentage >= 25.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Severity from the structured service's 0-10 score: high >= 7.0, medium >= 4.0
pub fn severity_from_score(score: f32) -> Severity {
    if score >= 7.0 {
        Severity::High
    } else if score >= 4.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_thresholds_exact() {
        assert_eq!(severity_from_percentage(50.0), Severity::High);
        assert_eq!(severity_from_percentage(49.999), Severity::Medium);
        assert_eq!(severity_from_percentage(25.0), Severity::Medium);
        assert_eq!(severity_from_percentage(24.999), Severity::Low);
        assert_eq!(severity_from_percentage(0.0), Severity::Low);
        assert_eq!(severity_from_percentage(100.0), Severity::High);
    }

    #[test]
    fn test_score_thresholds_exact() {
        assert_eq!(severity_from_score(7.0), Severity::High);
        assert_eq!(severity_from_score(6.999), Severity::Medium);
        assert_eq!(severity_from_score(4.0), Severity::Medium);
        assert_eq!(severity_from_score(3.999), Severity::Low);
    }

    #[test]
    fn test_mapping_is_idempotent() {
        for p in [0.0, 12.5, 25.0, 37.0, 50.0, 88.8] {
            assert_eq!(severity_from_percentage(p), severity_from_percentage(p));
        }
    }
}
