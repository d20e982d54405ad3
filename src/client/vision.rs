//! Structured vision-analysis service client
//!
//! Speaks the backend's REST interface: image upload, analysis submission,
//! job status polling, result fetch, and a startup liveness probe.

use reqwest::Client;

use crate::model::backend::{
    AnalyzeRequest, AnalyzeResponse, BackendJobStatus, BackendReport, UploadResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Analysis not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error: {0}")]
    Service(String),
}

/// Client for the structured vision-analysis service
#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    base_url: String,
}

impl VisionClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Liveness probe, checked once at startup.
    ///
    /// Unreachability immediately routes all requests to the fallback tiers.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/status", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(url = %url, "Structured analysis service reachable");
                true
            }
            Ok(resp) => {
                tracing::warn!(url = %url, status = %resp.status(), "Structured analysis service unhealthy");
                false
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Structured analysis service unreachable");
                false
            }
        }
    }

    /// Upload one image, returning the server-assigned identifier
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, VisionError> {
        let url = format!("{}/upload-image", self.base_url);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = check_status(response).await?;

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Service(format!("Failed to deserialize upload: {}", e)))?;

        tracing::debug!(image_id = %upload.image_id, "Image uploaded");
        Ok(upload.image_id)
    }

    /// Submit an analysis request.
    ///
    /// The service may respond synchronously with a complete report or
    /// asynchronously with a queued job.
    pub async fn submit_analysis(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, VisionError> {
        let url = format!("{}/analyze", self.base_url);

        tracing::debug!(
            before = %request.before_image_id,
            after = %request.after_image_id,
            disaster_type = %request.disaster_type,
            "Submitting analysis request"
        );

        let response = self.client.post(&url).json(request).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| VisionError::Service(format!("Failed to deserialize analysis: {}", e)))
    }

    /// Read status and progress of an in-flight job
    pub async fn job_status(&self, job_id: &str) -> Result<BackendJobStatus, VisionError> {
        let url = format!("{}/analysis-status/{}", self.base_url, job_id);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(VisionError::NotFound(job_id.to_string()));
        }
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| VisionError::Service(format!("Failed to deserialize status: {}", e)))
    }

    /// Fetch the full result of a completed job
    pub async fn fetch_result(&self, job_id: &str) -> Result<BackendReport, VisionError> {
        let url = format!("{}/analysis-result/{}", self.base_url, job_id);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(VisionError::NotFound(job_id.to_string()));
        }
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| VisionError::Service(format!("Failed to deserialize result: {}", e)))
    }

    /// Fetch up to `count` recommendations for a completed analysis
    pub async fn recommendations(
        &self,
        analysis_id: &str,
        count: usize,
    ) -> Result<Vec<String>, VisionError> {
        let url = format!(
            "{}/recommendations/{}?count={}",
            self.base_url, analysis_id, count
        );

        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| VisionError::Service(format!("Failed to deserialize recommendations: {}", e)))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, VisionError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(VisionError::Service(format!(
            "Unexpected status {}: {}",
            status, body
        )));
    }
    Ok(response)
}
