//! Knowledge base entry types used by the retrieval engine

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::request::DisasterType;

/// Supported languages for knowledge entries and queries.
///
/// Hindi is detected by a Devanagari script-range heuristic, not a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Hindi,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeMetadata {
    pub title: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disaster_type: Option<DisasterType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default = "default_language")]
    pub language: Language,
}

fn default_language() -> Language {
    Language::English
}

/// One pre-embedded domain document. Loaded once at process start,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: u32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: KnowledgeMetadata,
}

/// One ranked retrieval hit with its boosted relevance score
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: f32,
}

/// Ranked subsequence of the knowledge base, recomputed per query
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub entries: Vec<ScoredEntry>,
}

impl RetrievalResult {
    pub fn best(&self) -> Option<&ScoredEntry> {
        self.entries.first()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|s| s.entry.metadata.title.clone())
            .collect()
    }
}
