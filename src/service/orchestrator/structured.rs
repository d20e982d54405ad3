//! Primary analysis tier backed by the structured vision service

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::VisionClient;
use crate::model::backend::{AnalyzeRequest, AnalyzeResponse, BackendReport};
use crate::model::{
    report_from_backend, AnalysisRequest, AnalysisResult, ImageHandle, PollConfig,
    MAX_RECOMMENDATIONS,
};
use crate::service::images::ImageStore;

use super::polling::poll_job;
use super::{AnalysisTier, ProgressHandle, TierError};

/// Reports carrying fewer recommendations than this are topped up from the
/// dedicated recommendations endpoint
const MIN_RECOMMENDATIONS: usize = 3;

fn wants_recommendation_top_up(report: &BackendReport) -> bool {
    report.recommendations.len() < MIN_RECOMMENDATIONS
}

pub struct StructuredTier {
    client: VisionClient,
    images: Arc<ImageStore>,
    poll: PollConfig,
    /// Set once by the startup probe; false routes straight to fallbacks
    service_available: Arc<AtomicBool>,
}

impl StructuredTier {
    pub fn new(
        client: VisionClient,
        images: Arc<ImageStore>,
        poll: PollConfig,
        service_available: Arc<AtomicBool>,
    ) -> Self {
        Self {
            client,
            images,
            poll,
            service_available,
        }
    }

    /// Upload the image unless a server id already exists from an earlier run
    async fn ensure_uploaded(&self, handle: &ImageHandle) -> Result<String, TierError> {
        if let Some(server_id) = self.images.server_id(&handle.id) {
            return Ok(server_id);
        }

        let (filename, bytes) = self
            .images
            .bytes(&handle.id)
            .ok_or_else(|| TierError::Service(format!("unknown image: {}", handle.id)))?;

        let server_id = self.client.upload_image(&filename, bytes).await?;
        self.images.set_server_id(&handle.id, server_id.clone());
        Ok(server_id)
    }
}

#[async_trait]
impl AnalysisTier for StructuredTier {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn available(&self) -> bool {
        self.service_available.load(Ordering::Relaxed)
    }

    async fn attempt(
        &self,
        request: &AnalysisRequest,
        progress: &ProgressHandle,
    ) -> Result<AnalysisResult, TierError> {
        let before_id = self.ensure_uploaded(&request.before).await?;
        let after_id = self.ensure_uploaded(&request.after).await?;
        progress.update(10);

        if !progress.is_current() {
            return Err(TierError::Stale);
        }

        let analyze = AnalyzeRequest {
            before_image_id: before_id,
            after_image_id: after_id,
            disaster_type: request.disaster_type.as_str().to_string(),
            analysis_level: request.analysis_level.as_str().to_string(),
            async_mode: true,
        };

        let mut report = match self.client.submit_analysis(&analyze).await? {
            AnalyzeResponse::Complete(report) => *report,
            AnalyzeResponse::Job(job) => {
                tracing::info!(job_id = %job.id, "Analysis queued, polling for completion");
                poll_job(&self.client, &job.id, &self.poll, progress).await?
            }
        };

        if wants_recommendation_top_up(&report) {
            match self
                .client
                .recommendations(&report.analysis_id, MAX_RECOMMENDATIONS)
                .await
            {
                Ok(fetched) if !fetched.is_empty() => report.recommendations = fetched,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(analysis_id = %report.analysis_id, error = %e, "Recommendation top-up failed")
                }
            }
        }

        if !progress.is_current() {
            return Err(TierError::Stale);
        }

        Ok(report_from_backend(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn report(recommendations: Vec<String>) -> BackendReport {
        BackendReport {
            analysis_id: "a-1".to_string(),
            damage_percentage: 40.0,
            severity_score: 5.0,
            affected_areas: vec![],
            building_damage: vec![],
            road_damage: vec![],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            damage_type_counts: HashMap::new(),
            recommendations,
        }
    }

    #[test]
    fn test_sparse_reports_want_top_up() {
        assert!(wants_recommendation_top_up(&report(vec![])));
        assert!(wants_recommendation_top_up(&report(vec![
            "a".to_string(),
            "b".to_string()
        ])));
        assert!(!wants_recommendation_top_up(&report(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ])));
    }
}
