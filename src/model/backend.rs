//! Wire schema of the structured vision-analysis service
//!
//! The backend reports a 0-10 severity score and a damage-type histogram
//! alongside the typed damage arrays; conversion to the domain model lives
//! in `model::convert`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::request::JobStatus;

/// `POST /upload-image` response
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub image_id: String,
}

/// `POST /analyze` request body
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub before_image_id: String,
    pub after_image_id: String,
    pub disaster_type: String,
    pub analysis_level: String,
    pub async_mode: bool,
}

/// `POST /analyze` may answer synchronously with a complete report or
/// asynchronously with a queued job
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Complete(Box<BackendReport>),
    Job(BackendJob),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendJob {
    #[serde(alias = "analysis_id")]
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
}

/// `GET /analysis-status/{id}` response
#[derive(Debug, Clone, Deserialize)]
pub struct BackendJobStatus {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
}

/// One region as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRegion {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub severity: String,
    pub confidence: f32,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /analysis-result/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendReport {
    pub analysis_id: String,
    pub damage_percentage: f32,
    /// 0-10 scale
    pub severity_score: f32,
    #[serde(default)]
    pub affected_areas: Vec<String>,
    #[serde(default)]
    pub building_damage: Vec<BackendRegion>,
    #[serde(default)]
    pub road_damage: Vec<BackendRegion>,
    #[serde(default)]
    pub flooded_areas: Vec<BackendRegion>,
    #[serde(default)]
    pub vegetation_loss: Vec<BackendRegion>,
    /// Histogram of damage-type occurrences, e.g. {"structural": 4}
    #[serde(default)]
    pub damage_type_counts: HashMap<String, u32>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
