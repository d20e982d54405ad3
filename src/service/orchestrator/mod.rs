//! Analysis orchestrator
//!
//! Owns the lifecycle of one analysis request: an explicit ordered list of
//! tiers is tried in sequence until one produces a report. The synthetic
//! tier never fails, so every request terminates with a well-formed result.
//! Staleness is enforced at the consumption boundary: every continuation
//! compares its captured request token against the live generation before
//! committing a write.

pub mod narrative_vision;
pub mod polling;
pub mod structured;
pub mod synthetic;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::client::{NarrativeError, VisionError};
use crate::model::{AnalysisRequest, AnalysisResult};
use crate::service::images::ImageStore;
use crate::service::session::SessionStore;

/// Advisory surfaced when a fallback tier produced the result
pub const FALLBACK_ADVISORY: &str = "Using fallback analysis; results may be less accurate";

#[derive(Debug, thiserror::Error)]
pub enum TierError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Service failure: {0}")]
    Service(String),

    #[error("Missing or malformed credential")]
    Credential,

    #[error("Analysis job failed: {0}")]
    JobFailed(String),

    #[error("Polling exceeded the wait cap")]
    Timeout,

    #[error("Request superseded")]
    Stale,
}

impl From<VisionError> for TierError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Transport(e) => TierError::Transport(e.to_string()),
            VisionError::NotFound(id) => TierError::Service(format!("not found: {}", id)),
            VisionError::Service(msg) => TierError::Service(msg),
        }
    }
}

impl From<NarrativeError> for TierError {
    fn from(err: NarrativeError) -> Self {
        match err {
            NarrativeError::Credential => TierError::Credential,
            NarrativeError::Transport(e) => TierError::Transport(e.to_string()),
            NarrativeError::Service(msg) => TierError::Service(msg),
            NarrativeError::EmptyResponse => {
                TierError::Service("empty choice list".to_string())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The only user-visible hard failure: no before/after pair supplied
    #[error("Both before and after images are required")]
    MissingImages,

    /// A newer request took over while this one was in flight
    #[error("Request superseded by a newer one")]
    Superseded,

    /// Unreachable while the synthetic tier is last; kept for completeness
    #[error("All analysis tiers failed")]
    Exhausted,
}

/// Generation counter shared by all continuations of the session.
///
/// Starting a new request bumps the generation in a single atomic store;
/// an old token then no longer matches and its writes are dropped.
#[derive(Default)]
pub struct RequestTracker {
    generation: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new request, invalidating any in-flight one
    pub fn begin(self: &Arc<Self>) -> RequestToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            generation,
            tracker: Arc::clone(self),
        }
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Captured identity of one request
#[derive(Clone)]
pub struct RequestToken {
    generation: u64,
    tracker: Arc<RequestTracker>,
}

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.tracker.current() == self.generation
    }
}

/// Progress for the live request; never regresses within one generation
#[derive(Default)]
pub struct ProgressTracker {
    state: Mutex<(u64, u8)>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a new generation; an older one arriving late never clobbers
    /// the live one
    fn begin(&self, generation: u64) {
        let mut state = self.state.lock().expect("progress lock");
        if generation > state.0 {
            *state = (generation, 0);
        }
    }

    /// Apply an observation; stale or regressing values are dropped
    fn update(&self, token: &RequestToken, progress: u8) -> bool {
        let mut state = self.state.lock().expect("progress lock");
        if state.0 != token.generation || !token.is_current() {
            tracing::debug!(
                generation = token.generation,
                "Dropped stale progress observation"
            );
            return false;
        }
        if progress > state.1 {
            state.1 = progress.min(100);
        }
        true
    }

    /// Live (generation, progress) pair
    pub fn snapshot(&self) -> (u64, u8) {
        *self.state.lock().expect("progress lock")
    }
}

/// Handle passed into tiers for progress reporting and staleness checks
#[derive(Clone)]
pub struct ProgressHandle {
    token: RequestToken,
    tracker: Arc<ProgressTracker>,
}

impl ProgressHandle {
    #[cfg(test)]
    pub(crate) fn for_tests(token: RequestToken, tracker: Arc<ProgressTracker>) -> Self {
        Self { token, tracker }
    }

    pub fn is_current(&self) -> bool {
        self.token.is_current()
    }

    pub fn update(&self, progress: u8) -> bool {
        self.tracker.update(&self.token, progress)
    }
}

/// One strategy in the fallback chain
#[async_trait]
pub trait AnalysisTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap availability gate; unavailable tiers are skipped silently
    fn available(&self) -> bool {
        true
    }

    async fn attempt(
        &self,
        request: &AnalysisRequest,
        progress: &ProgressHandle,
    ) -> Result<AnalysisResult, TierError>;
}

/// Final outcome delivered to the caller
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Name of the tier that produced the result
    pub tier: &'static str,
    /// Present when any earlier tier failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

pub struct AnalysisOrchestrator {
    tiers: Vec<Box<dyn AnalysisTier>>,
    tracker: Arc<RequestTracker>,
    progress: Arc<ProgressTracker>,
    images: Arc<ImageStore>,
    sessions: Arc<SessionStore>,
}

impl AnalysisOrchestrator {
    pub fn new(
        tiers: Vec<Box<dyn AnalysisTier>>,
        images: Arc<ImageStore>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            tiers,
            tracker: Arc::new(RequestTracker::new()),
            progress: Arc::new(ProgressTracker::new()),
            images,
            sessions,
        }
    }

    pub fn progress(&self) -> (u64, u8) {
        self.progress.snapshot()
    }

    /// Run one analysis request through the tier chain.
    ///
    /// Starting a new request marks any in-flight one stale; its late
    /// observations are discarded, never merged.
    pub async fn run_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, OrchestratorError> {
        if !self.images.contains(&request.before.id) || !self.images.contains(&request.after.id) {
            return Err(OrchestratorError::MissingImages);
        }

        let token = self.tracker.begin();
        self.progress.begin(token.generation());
        let handle = ProgressHandle {
            token: token.clone(),
            tracker: Arc::clone(&self.progress),
        };

        let mut advisory = None;

        for tier in &self.tiers {
            if !tier.available() {
                tracing::info!(tier = tier.name(), "Tier unavailable, skipping");
                continue;
            }

            tracing::info!(
                tier = tier.name(),
                generation = token.generation(),
                disaster_type = %request.disaster_type.as_str(),
                "Attempting analysis tier"
            );

            match tier.attempt(request, &handle).await {
                Ok(result) => {
                    if !token.is_current() {
                        tracing::warn!(
                            tier = tier.name(),
                            generation = token.generation(),
                            "Discarding result of superseded request"
                        );
                        return Err(OrchestratorError::Superseded);
                    }
                    handle.update(100);
                    self.sessions.record(result.clone(), request.disaster_type);
                    tracing::info!(
                        tier = tier.name(),
                        result_id = %result.id,
                        damage_percentage = result.damage_percentage,
                        "Analysis completed"
                    );
                    return Ok(AnalysisOutcome {
                        result,
                        tier: tier.name(),
                        advisory,
                    });
                }
                Err(TierError::Stale) => {
                    tracing::info!(
                        tier = tier.name(),
                        generation = token.generation(),
                        "Request superseded during tier attempt"
                    );
                    return Err(OrchestratorError::Superseded);
                }
                Err(e) => {
                    tracing::warn!(
                        tier = tier.name(),
                        error = %e,
                        "Tier failed, falling through"
                    );
                    advisory = Some(FALLBACK_ADVISORY.to_string());
                }
            }
        }

        Err(OrchestratorError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnalysisLevel, AnalysisSource, DisasterType, ImageHandle, Severity, SeverityBasis,
    };
    use chrono::Utc;
    use std::time::Duration;

    fn result(id: &str) -> AnalysisResult {
        AnalysisResult {
            id: id.to_string(),
            damage_percentage: 40.0,
            severity: Severity::Medium,
            severity_basis: SeverityBasis::Percentage,
            affected_areas: vec!["roads".to_string()],
            building_damage: vec![],
            road_damage: vec![],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            recommendations: vec![],
            created_at: Utc::now(),
            source: AnalysisSource::Synthetic,
        }
    }

    struct OkTier {
        id: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl AnalysisTier for OkTier {
        fn name(&self) -> &'static str {
            "ok"
        }

        async fn attempt(
            &self,
            _request: &AnalysisRequest,
            progress: &ProgressHandle,
        ) -> Result<AnalysisResult, TierError> {
            tokio::time::sleep(self.delay).await;
            if !progress.is_current() {
                return Err(TierError::Stale);
            }
            Ok(result(self.id))
        }
    }

    struct FailTier;

    #[async_trait]
    impl AnalysisTier for FailTier {
        fn name(&self) -> &'static str {
            "fail"
        }

        async fn attempt(
            &self,
            _request: &AnalysisRequest,
            _progress: &ProgressHandle,
        ) -> Result<AnalysisResult, TierError> {
            Err(TierError::Transport("connection refused".to_string()))
        }
    }

    struct UnavailableTier;

    #[async_trait]
    impl AnalysisTier for UnavailableTier {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn available(&self) -> bool {
            false
        }

        async fn attempt(
            &self,
            _request: &AnalysisRequest,
            _progress: &ProgressHandle,
        ) -> Result<AnalysisResult, TierError> {
            unreachable!("unavailable tier must never be attempted")
        }
    }

    fn request_with_images(images: &ImageStore) -> AnalysisRequest {
        let before = images.insert("before.png".to_string(), vec![1]);
        let after = images.insert("after.png".to_string(), vec![2]);
        AnalysisRequest {
            before,
            after,
            disaster_type: DisasterType::Flood,
            analysis_level: AnalysisLevel::Standard,
        }
    }

    fn orchestrator(
        tiers: Vec<Box<dyn AnalysisTier>>,
    ) -> (AnalysisOrchestrator, AnalysisRequest, Arc<SessionStore>) {
        let images = Arc::new(ImageStore::new());
        let sessions = Arc::new(SessionStore::new());
        let request = request_with_images(&images);
        (
            AnalysisOrchestrator::new(tiers, images, Arc::clone(&sessions)),
            request,
            sessions,
        )
    }

    #[tokio::test]
    async fn test_missing_images_is_hard_error() {
        let images = Arc::new(ImageStore::new());
        let sessions = Arc::new(SessionStore::new());
        let orch = AnalysisOrchestrator::new(vec![], images, sessions);

        let request = AnalysisRequest {
            before: ImageHandle::new("nope"),
            after: ImageHandle::new("nope2"),
            disaster_type: DisasterType::Flood,
            analysis_level: AnalysisLevel::Basic,
        };
        assert!(matches!(
            orch.run_analysis(&request).await,
            Err(OrchestratorError::MissingImages)
        ));
    }

    #[tokio::test]
    async fn test_fallback_chain_sets_advisory() {
        let (orch, request, _) = orchestrator(vec![
            Box::new(FailTier),
            Box::new(UnavailableTier),
            Box::new(OkTier {
                id: "r1",
                delay: Duration::ZERO,
            }),
        ]);

        let outcome = orch.run_analysis(&request).await.unwrap();
        assert_eq!(outcome.result.id, "r1");
        assert_eq!(outcome.advisory.as_deref(), Some(FALLBACK_ADVISORY));
    }

    #[tokio::test]
    async fn test_first_tier_success_has_no_advisory() {
        let (orch, request, sessions) = orchestrator(vec![Box::new(OkTier {
            id: "r1",
            delay: Duration::ZERO,
        })]);

        let outcome = orch.run_analysis(&request).await.unwrap();
        assert!(outcome.advisory.is_none());
        assert_eq!(sessions.latest().unwrap().id, "r1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_request_never_overwrites_newer() {
        let images = Arc::new(ImageStore::new());
        let sessions = Arc::new(SessionStore::new());
        let request_a = request_with_images(&images);
        let request_b = request_with_images(&images);

        let orch = Arc::new(AnalysisOrchestrator::new(
            vec![Box::new(OkTier {
                id: "slow",
                delay: Duration::from_secs(5),
            })],
            Arc::clone(&images),
            Arc::clone(&sessions),
        ));

        let slow = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run_analysis(&request_a).await })
        };

        // Let A reach its sleep, then start B which supersedes it. The
        // fake tier for B also sleeps, so finish both.
        tokio::time::sleep(Duration::from_secs(1)).await;
        let fast = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run_analysis(&request_b).await })
        };

        let a_outcome = slow.await.unwrap();
        let b_outcome = fast.await.unwrap();

        assert!(matches!(a_outcome, Err(OrchestratorError::Superseded)));
        assert!(b_outcome.is_ok());
        assert_eq!(sessions.latest().unwrap().id, "slow");
    }

    #[tokio::test]
    async fn test_progress_never_regresses() {
        let tracker = Arc::new(RequestTracker::new());
        let progress = Arc::new(ProgressTracker::new());
        let token = tracker.begin();
        progress.begin(token.generation());
        let handle = ProgressHandle {
            token,
            tracker: Arc::clone(&progress),
        };

        handle.update(30);
        handle.update(10);
        assert_eq!(progress.snapshot().1, 30);
        handle.update(80);
        assert_eq!(progress.snapshot().1, 80);
    }

    #[tokio::test]
    async fn test_late_begin_of_older_generation_ignored() {
        let tracker = Arc::new(RequestTracker::new());
        let progress = Arc::new(ProgressTracker::new());

        // Two requests race: the older one's begin lands after the newer one's
        let old_token = tracker.begin();
        let new_token = tracker.begin();
        progress.begin(new_token.generation());
        progress.begin(old_token.generation());

        let handle = ProgressHandle::for_tests(new_token.clone(), Arc::clone(&progress));
        assert!(handle.update(50));
        assert_eq!(progress.snapshot(), (new_token.generation(), 50));
    }

    #[tokio::test]
    async fn test_stale_progress_dropped() {
        let tracker = Arc::new(RequestTracker::new());
        let progress = Arc::new(ProgressTracker::new());
        let old_token = tracker.begin();
        progress.begin(old_token.generation());
        let old_handle = ProgressHandle {
            token: old_token,
            tracker: Arc::clone(&progress),
        };

        // A newer request takes over
        let new_token = tracker.begin();
        progress.begin(new_token.generation());

        assert!(!old_handle.update(90));
        assert_eq!(progress.snapshot(), (new_token.generation(), 0));
    }
}
