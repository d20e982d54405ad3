//! Secondary tier: narrative-vision description plus heuristic extraction
//!
//! Sends both images inline to the narrative service and recovers a
//! structured report from the prose it returns. Gated on a format-valid
//! credential.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::client::NarrativeClient;
use crate::model::{AnalysisRequest, AnalysisResult, ImageHandle};
use crate::service::extractor;
use crate::service::images::ImageStore;
use crate::service::rng::RandomSource;

use super::{AnalysisTier, ProgressHandle, TierError};

const ANALYSIS_PROMPT: &str = "You are a disaster damage assessment expert. Compare the two \
satellite images: the first was taken before the disaster and the second after. Describe the \
visible damage, state an overall damage percentage, list the affected areas, and finish with \
a numbered list of recommendations under a 'Recommendations:' heading.";

pub struct NarrativeVisionTier {
    client: NarrativeClient,
    images: Arc<ImageStore>,
    rng: Arc<dyn RandomSource>,
}

impl NarrativeVisionTier {
    pub fn new(client: NarrativeClient, images: Arc<ImageStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            client,
            images,
            rng,
        }
    }

    fn encoded(&self, handle: &ImageHandle) -> Result<String, TierError> {
        let (_, bytes) = self
            .images
            .bytes(&handle.id)
            .ok_or_else(|| TierError::Service(format!("unknown image: {}", handle.id)))?;
        Ok(STANDARD.encode(bytes))
    }
}

#[async_trait]
impl AnalysisTier for NarrativeVisionTier {
    fn name(&self) -> &'static str {
        "narrative-vision"
    }

    fn available(&self) -> bool {
        self.client.is_configured()
    }

    async fn attempt(
        &self,
        request: &AnalysisRequest,
        progress: &ProgressHandle,
    ) -> Result<AnalysisResult, TierError> {
        let before = self.encoded(&request.before)?;
        let after = self.encoded(&request.after)?;
        progress.update(20);

        let narrative = self
            .client
            .analyze_images(ANALYSIS_PROMPT, &before, &after)
            .await?;

        if !progress.is_current() {
            return Err(TierError::Stale);
        }
        progress.update(80);

        tracing::debug!(chars = narrative.len(), "Extracting report from narrative");
        Ok(extractor::extract(
            &narrative,
            request.disaster_type,
            self.rng.as_ref(),
        ))
    }
}
