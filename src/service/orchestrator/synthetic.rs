//! Last-resort tier producing a plausible synthetic report
//!
//! Requires no external services and never fails, so the chain always
//! terminates with a well-formed result.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::model::{
    severity_from_percentage, AnalysisRequest, AnalysisResult, AnalysisSource, BoundingRegion,
    DamageRecord, SeverityBasis,
};
use crate::service::extractor::rules::{default_areas, default_recommendations};
use crate::service::rng::RandomSource;

use super::{AnalysisTier, ProgressHandle, TierError};

const PCT_LO: f32 = 30.0;
const PCT_HI: f32 = 70.0;

pub struct SyntheticTier {
    rng: Arc<dyn RandomSource>,
}

impl SyntheticTier {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl AnalysisTier for SyntheticTier {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn attempt(
        &self,
        request: &AnalysisRequest,
        progress: &ProgressHandle,
    ) -> Result<AnalysisResult, TierError> {
        let damage_percentage = self.rng.in_range(PCT_LO, PCT_HI);
        progress.update(50);

        tracing::info!(
            disaster_type = %request.disaster_type.as_str(),
            damage_percentage,
            "Producing synthetic report"
        );

        Ok(AnalysisResult {
            id: Uuid::new_v4().to_string(),
            damage_percentage,
            severity: severity_from_percentage(damage_percentage),
            severity_basis: SeverityBasis::Percentage,
            affected_areas: default_areas(request.disaster_type)
                .iter()
                .map(|a| a.to_string())
                .collect(),
            building_damage: vec![DamageRecord {
                id: 1,
                region: BoundingRegion::new(140, 90, 150, 120),
                label: "moderate".to_string(),
                confidence: 0.6,
                note: Some("Representative structure in the damage zone".to_string()),
            }],
            road_damage: vec![DamageRecord {
                id: 1,
                region: BoundingRegion::new(60, 250, 300, 50),
                label: "partial".to_string(),
                confidence: 0.55,
                note: None,
            }],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            recommendations: default_recommendations(request.disaster_type)
                .iter()
                .map(|r| r.to_string())
                .collect(),
            created_at: Utc::now(),
            source: AnalysisSource::Synthetic,
        })
    }
}
