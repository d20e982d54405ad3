//! Conversion from the structured service's wire schema to the domain model

use chrono::Utc;

use crate::model::backend::{BackendRegion, BackendReport};
use crate::model::report::{
    severity_from_score, AnalysisResult, AnalysisSource, BoundingRegion, DamageRecord,
    SeverityBasis,
};

/// Maximum affected areas carried on a result
pub const MAX_AREAS: usize = 5;
/// Maximum recommendations carried on a result
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Convert a backend report into a domain `AnalysisResult`.
///
/// Severity comes from the service's 0-10 score, and the basis is recorded
/// so the label can be re-derived from the stored score path.
pub fn report_from_backend(report: BackendReport) -> AnalysisResult {
    let severity = severity_from_score(report.severity_score);

    AnalysisResult {
        id: report.analysis_id,
        damage_percentage: report.damage_percentage.clamp(0.0, 100.0),
        severity,
        severity_basis: SeverityBasis::ServiceScore,
        affected_areas: dedup_capped(report.affected_areas, MAX_AREAS),
        building_damage: records_from_regions(&report.building_damage),
        road_damage: records_from_regions(&report.road_damage),
        flooded_areas: records_from_regions(&report.flooded_areas),
        vegetation_loss: records_from_regions(&report.vegetation_loss),
        recommendations: dedup_capped(report.recommendations, MAX_RECOMMENDATIONS),
        created_at: Utc::now(),
        source: AnalysisSource::Structured,
    }
}

fn records_from_regions(regions: &[BackendRegion]) -> Vec<DamageRecord> {
    regions
        .iter()
        .map(|r| DamageRecord {
            id: r.id,
            region: BoundingRegion::new(r.x, r.y, r.width, r.height),
            label: r.severity.clone(),
            confidence: r.confidence.clamp(0.0, 1.0),
            note: r.description.clone(),
        })
        .collect()
}

/// Deduplicate preserving first occurrence, then cap
pub fn dedup_capped(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.to_lowercase()))
        .take(cap)
        .collect()
}
