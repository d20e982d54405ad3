//! Analysis request types: image handles, disaster taxonomy, job tracking

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque reference to an uploaded image.
///
/// The image store is the sole authority for the bytes and for the
/// server-assigned identifier recorded after upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageHandle {
    /// Local identifier assigned by the image store
    pub id: String,
}

impl ImageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisasterType {
    Hurricane,
    Flood,
    Earthquake,
    Wildfire,
    Tornado,
    Landslide,
}

impl DisasterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisasterType::Hurricane => "hurricane",
            DisasterType::Flood => "flood",
            DisasterType::Earthquake => "earthquake",
            DisasterType::Wildfire => "wildfire",
            DisasterType::Tornado => "tornado",
            DisasterType::Landslide => "landslide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisLevel {
    Basic,
    Standard,
    Detailed,
}

impl AnalysisLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisLevel::Basic => "basic",
            AnalysisLevel::Standard => "standard",
            AnalysisLevel::Detailed => "detailed",
        }
    }
}

/// One analysis request, created per user action and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub before: ImageHandle,
    pub after: ImageHandle,
    pub disaster_type: DisasterType,
    pub analysis_level: AnalysisLevel,
}

/// Lifecycle of an asynchronous structured analysis job; Completed and
/// Failed are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}
