//! Report export and import
//!
//! A snapshot wraps one analysis result with naming metadata and a content
//! hash over the result's canonical JSON. Import verifies the hash, so a
//! snapshot edited in transit is rejected instead of silently trusted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::client::VisionClient;
use crate::model::{report_from_backend, AnalysisResult, AnalysisSource};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot content hash does not match its result")]
    HashMismatch,
}

/// Portable, named snapshot of one analysis result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub exported_at: DateTime<Utc>,
    /// Hex SHA-256 over the result's canonical JSON
    pub content_hash: String,
    pub result: AnalysisResult,
}

fn content_hash(result: &AnalysisResult) -> Result<String, ExportError> {
    let canonical = serde_json::to_vec(result)?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{:x}", digest))
}

pub struct ExportService {
    vision: VisionClient,
    /// Startup probe outcome; gates the authoritative re-fetch
    vision_available: Arc<AtomicBool>,
}

impl ExportService {
    pub fn new(vision: VisionClient, vision_available: Arc<AtomicBool>) -> Self {
        Self {
            vision,
            vision_available,
        }
    }

    /// Build a snapshot for `result` under a user-chosen name.
    ///
    /// Structured results are re-fetched from the vision service when it is
    /// reachable, so the snapshot carries the authoritative record rather
    /// than the session copy.
    pub async fn export(
        &self,
        result: &AnalysisResult,
        name: String,
        tags: Vec<String>,
    ) -> Result<ReportSnapshot, ExportError> {
        let result = self.authoritative(result).await;
        let content_hash = content_hash(&result)?;

        tracing::info!(result_id = %result.id, name = %name, "Exported report snapshot");

        Ok(ReportSnapshot {
            id: result.id.clone(),
            name,
            tags,
            created_at: result.created_at,
            exported_at: Utc::now(),
            content_hash,
            result,
        })
    }

    /// Verify a snapshot's hash and hand back the embedded result
    pub fn import(&self, snapshot: &ReportSnapshot) -> Result<AnalysisResult, ExportError> {
        let expected = content_hash(&snapshot.result)?;
        if expected != snapshot.content_hash {
            tracing::warn!(id = %snapshot.id, "Rejected snapshot with mismatched hash");
            return Err(ExportError::HashMismatch);
        }
        Ok(snapshot.result.clone())
    }

    async fn authoritative(&self, result: &AnalysisResult) -> AnalysisResult {
        if result.source != AnalysisSource::Structured
            || !self.vision_available.load(Ordering::Relaxed)
        {
            return result.clone();
        }

        match self.vision.fetch_result(&result.id).await {
            Ok(report) => {
                tracing::debug!(result_id = %result.id, "Refreshed report from service");
                let mut refreshed = report_from_backend(report);
                refreshed.created_at = result.created_at;
                refreshed
            }
            Err(e) => {
                tracing::warn!(result_id = %result.id, error = %e, "Refresh failed, exporting session copy");
                result.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, SeverityBasis};

    fn service() -> ExportService {
        ExportService::new(
            VisionClient::new("http://127.0.0.1:1/api".to_string()),
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            id: "r1".to_string(),
            damage_percentage: 33.0,
            severity: Severity::Medium,
            severity_basis: SeverityBasis::Percentage,
            affected_areas: vec!["roads".to_string()],
            building_damage: vec![],
            road_damage: vec![],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            recommendations: vec!["Clear roads".to_string()],
            created_at: Utc::now(),
            source: AnalysisSource::NarrativeVision,
        }
    }

    #[tokio::test]
    async fn test_export_import_roundtrip() {
        let service = service();
        let original = result();
        let snapshot = service
            .export(&original, "field-survey".to_string(), vec!["flood".to_string()])
            .await
            .unwrap();

        assert_eq!(snapshot.id, "r1");
        assert_eq!(snapshot.name, "field-survey");

        let restored = service.import(&snapshot).unwrap();
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn test_tampered_snapshot_rejected() {
        let service = service();
        let mut snapshot = service
            .export(&result(), "survey".to_string(), vec![])
            .await
            .unwrap();

        snapshot.result.damage_percentage = 99.0;
        assert!(matches!(
            service.import(&snapshot),
            Err(ExportError::HashMismatch)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_exports_session_copy() {
        // vision_available is false, so no network call is attempted
        let service = service();
        let mut structured = result();
        structured.source = AnalysisSource::Structured;

        let snapshot = service
            .export(&structured, "survey".to_string(), vec![])
            .await
            .unwrap();
        assert_eq!(snapshot.result, structured);
    }
}
