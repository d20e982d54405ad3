//! Conversational assessment assistant
//!
//! Every reply is grounded in retrieved knowledge and the session's latest
//! analysis. The narrative service generates the prose; when it is missing
//! or failing, a deterministic template reply takes over so the assistant
//! never surfaces a hard error to the user.

mod prompts;

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::client::{ChatMessage, NarrativeClient};
use crate::model::{AnalysisResult, DisasterType};
use crate::service::language::{resolve_directive, LanguagePreference};
use crate::service::retrieval::RetrievalEngine;

pub use prompts::{build_system_prompt, fallback_narrative};

/// One assistant reply with the titles of the knowledge entries behind it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssistantReply {
    pub text: String,
    /// Titles of the retrieved entries that grounded this reply
    pub sources: Vec<String>,
}

pub struct AssessmentAssistant {
    retrieval: Arc<RetrievalEngine>,
    client: NarrativeClient,
    top_n: usize,
}

impl AssessmentAssistant {
    pub fn new(retrieval: Arc<RetrievalEngine>, client: NarrativeClient, top_n: usize) -> Self {
        Self {
            retrieval,
            client,
            top_n,
        }
    }

    /// Answer one user message in the context of the session
    pub async fn respond(
        &self,
        user_message: &str,
        history: &[ChatMessage],
        disaster_type: Option<DisasterType>,
        analysis: Option<&AnalysisResult>,
        preference: LanguagePreference,
    ) -> AssistantReply {
        let retrieval_type = disaster_type.unwrap_or(DisasterType::Flood);
        let retrieved = self
            .retrieval
            .retrieve(user_message, retrieval_type, self.top_n);
        let language = resolve_directive(preference, user_message);

        let system_prompt = build_system_prompt(disaster_type, language, analysis, &retrieved);

        let mut messages: Vec<ChatMessage> = history.to_vec();
        messages.push(ChatMessage::user(user_message));

        let text = match self.client.chat(&system_prompt, &messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Narrative service unavailable, using template reply");
                fallback_narrative(language, analysis, &retrieved)
            }
        };

        AssistantReply {
            text,
            sources: retrieved.titles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnalysisSource, KnowledgeDoc, Language, RetrievalResult, Severity, SeverityBasis,
    };
    use crate::service::embedding::{Embedder, TrigEmbedder};
    use crate::service::knowledge::KnowledgeBase;
    use chrono::Utc;

    fn assistant_without_credential() -> AssessmentAssistant {
        let embedder: Arc<dyn Embedder> = Arc::new(TrigEmbedder);
        let base = Arc::new(KnowledgeBase::load(&embedder, &Vec::<KnowledgeDoc>::new()));
        let retrieval = Arc::new(RetrievalEngine::new(base, embedder));
        let client = NarrativeClient::new(
            "https://example.invalid/v1".to_string(),
            None,
            "test-model".to_string(),
        );
        AssessmentAssistant::new(retrieval, client, 3)
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            id: "a1".to_string(),
            damage_percentage: 62.0,
            severity: Severity::High,
            severity_basis: SeverityBasis::Percentage,
            affected_areas: vec!["roads".to_string(), "residential".to_string()],
            building_damage: vec![],
            road_damage: vec![],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            recommendations: vec![],
            created_at: Utc::now(),
            source: AnalysisSource::NarrativeVision,
        }
    }

    #[tokio::test]
    async fn test_fallback_reply_is_grounded_and_sourced() {
        let assistant = assistant_without_credential();
        let reply = assistant
            .respond(
                "How should I assess flood water damage?",
                &[],
                Some(DisasterType::Flood),
                Some(&analysis()),
                LanguagePreference::Auto,
            )
            .await;

        assert!(reply.text.contains("62"));
        assert!(!reply.sources.is_empty());
    }

    #[tokio::test]
    async fn test_forced_hindi_fallback() {
        let assistant = assistant_without_credential();
        let reply = assistant
            .respond(
                "What should I check first?",
                &[],
                Some(DisasterType::Earthquake),
                Some(&analysis()),
                LanguagePreference::ForcedHindi,
            )
            .await;

        // Reply must carry Devanagari text when Hindi is forced
        assert!(reply
            .text
            .chars()
            .any(|c| ('\u{0900}'..='\u{097F}').contains(&c)));
    }

    #[test]
    fn test_system_prompt_carries_context() {
        let retrieved = RetrievalResult::default();
        let prompt = build_system_prompt(
            Some(DisasterType::Hurricane),
            Language::English,
            Some(&analysis()),
            &retrieved,
        );

        assert!(prompt.contains("hurricane"));
        assert!(prompt.contains("62.0%"));
        assert!(prompt.contains("(0 total)"));
        assert!(prompt.contains("Respond in English"));
    }
}
