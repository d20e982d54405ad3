//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::client::{NarrativeClient, VisionClient};
use crate::model::Config;
use crate::service::embedding::{Embedder, TrigEmbedder};
use crate::service::knowledge::KnowledgeBase;
use crate::service::orchestrator::narrative_vision::NarrativeVisionTier;
use crate::service::orchestrator::structured::StructuredTier;
use crate::service::orchestrator::synthetic::SyntheticTier;
use crate::service::rng::{RandomSource, ThreadRandom};
use crate::service::{
    AnalysisOrchestrator, AnalysisTier, AssessmentAssistant, ExportService, ImageStore,
    RetrievalEngine, SessionStore,
};

/// Application state containing all services and shared resources
///
/// This struct centralizes service initialization and makes it easy to inject
/// dependencies into Actix-web handlers.
pub struct AppState {
    pub images: Arc<ImageStore>,
    pub sessions: Arc<SessionStore>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub assistant: Arc<AssessmentAssistant>,
    pub export: Arc<ExportService>,
    pub narrative_client: NarrativeClient,
    /// Startup probe outcome for the structured vision service
    pub vision_available: Arc<AtomicBool>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. A one-time liveness probe of the structured vision service
    /// 2. Knowledge base embedding
    /// 3. Tier chain assembly (structured, narrative-vision, synthetic)
    /// 4. Service dependency graph construction
    pub async fn new(config: Config) -> Self {
        let vision_client = VisionClient::new(config.vision_base_url.clone());
        let vision_available = Arc::new(AtomicBool::new(vision_client.probe().await));

        let narrative_client = NarrativeClient::new(
            config.narrative_base_url.clone(),
            config.narrative_api_key.clone(),
            config.narrative_model.clone(),
        );
        if !narrative_client.is_configured() {
            tracing::warn!("Narrative credential missing or malformed, narrative tier disabled");
        }

        let images = Arc::new(ImageStore::new());
        let sessions = Arc::new(SessionStore::new());
        let rng: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

        let embedder: Arc<dyn Embedder> = Arc::new(TrigEmbedder);
        let knowledge = Arc::new(KnowledgeBase::load(&embedder, &config.extra_knowledge));
        let retrieval = Arc::new(RetrievalEngine::new(knowledge, embedder));

        // Tier order is the fallback order
        let tiers: Vec<Box<dyn AnalysisTier>> = vec![
            Box::new(StructuredTier::new(
                vision_client.clone(),
                Arc::clone(&images),
                config.poll.clone(),
                Arc::clone(&vision_available),
            )),
            Box::new(NarrativeVisionTier::new(
                narrative_client.clone(),
                Arc::clone(&images),
                Arc::clone(&rng),
            )),
            Box::new(SyntheticTier::new(Arc::clone(&rng))),
        ];

        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            tiers,
            Arc::clone(&images),
            Arc::clone(&sessions),
        ));

        let assistant = Arc::new(AssessmentAssistant::new(
            Arc::clone(&retrieval),
            narrative_client.clone(),
            config.retrieval_top_n,
        ));

        let export = Arc::new(ExportService::new(
            vision_client,
            Arc::clone(&vision_available),
        ));

        Self {
            images,
            sessions,
            orchestrator,
            assistant,
            export,
            narrative_client,
            vision_available,
        }
    }
}
