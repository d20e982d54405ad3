//! Knowledge retrieval engine
//!
//! Linear cosine scan over the knowledge base with a language-aware boost.
//! Scoring, boost, and tie-break rules are exact: they silently decide
//! which evidence grounds every narrative response.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::model::{DisasterType, Language, RetrievalResult, ScoredEntry};
use crate::service::embedding::{cosine_similarity, Embedder};
use crate::service::knowledge::KnowledgeBase;
use crate::service::language::{detect_language, HINDI_REGION};

/// Multiplier applied to same-language or matching-region entries when the
/// query is detected as the secondary language
pub const LANGUAGE_BOOST: f32 = 1.5;

pub struct RetrievalEngine {
    base: Arc<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
}

impl RetrievalEngine {
    pub fn new(base: Arc<KnowledgeBase>, embedder: Arc<dyn Embedder>) -> Self {
        Self { base, embedder }
    }

    /// Return the top-N most relevant entries for a free-text query.
    ///
    /// Entries with no disaster tag or a tag equal to `disaster_type` are
    /// candidates. Ties break by knowledge base insertion order.
    pub fn retrieve(
        &self,
        query: &str,
        disaster_type: DisasterType,
        top_n: usize,
    ) -> RetrievalResult {
        let query_embedding = self.embedder.embed(query);
        let query_language = detect_language(query);

        let mut scored: Vec<ScoredEntry> = self
            .base
            .entries()
            .iter()
            .filter(|e| {
                e.metadata
                    .disaster_type
                    .map_or(true, |t| t == disaster_type)
            })
            .map(|entry| {
                let mut score = cosine_similarity(&query_embedding, &entry.embedding);
                if query_language == Language::Hindi && boost_applies(entry.metadata.language, entry.metadata.region.as_deref()) {
                    score *= LANGUAGE_BOOST;
                }
                ScoredEntry {
                    entry: entry.clone(),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.entry.id.cmp(&b.entry.id))
        });
        scored.truncate(top_n);

        tracing::debug!(
            query_language = ?query_language,
            disaster_type = %disaster_type.as_str(),
            hits = scored.len(),
            "Retrieval completed"
        );

        RetrievalResult { entries: scored }
    }
}

fn boost_applies(language: Language, region: Option<&str>) -> bool {
    language == Language::Hindi || region == Some(HINDI_REGION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KnowledgeDoc;
    use crate::service::embedding::TrigEmbedder;

    fn engine_with(extra: Vec<KnowledgeDoc>) -> RetrievalEngine {
        let embedder: Arc<dyn Embedder> = Arc::new(TrigEmbedder);
        let base = Arc::new(KnowledgeBase::load(&embedder, &extra));
        RetrievalEngine::new(base, embedder)
    }

    #[test]
    fn test_retrieval_is_deterministic() {
        let engine = engine_with(vec![]);
        let first = engine.retrieve("flood water assessment", DisasterType::Flood, 3);
        let second = engine.retrieve("flood water assessment", DisasterType::Flood, 3);

        let ids = |r: &RetrievalResult| r.entries.iter().map(|s| s.entry.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert!(first.entries.len() <= 3);
        for (a, b) in first.entries.iter().zip(&second.entries) {
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_disaster_filter_excludes_other_tags() {
        let engine = engine_with(vec![]);
        let result = engine.retrieve("structural damage", DisasterType::Earthquake, 10);
        for hit in &result.entries {
            let tag = hit.entry.metadata.disaster_type;
            assert!(tag.is_none() || tag == Some(DisasterType::Earthquake));
        }
    }

    #[test]
    fn test_secondary_language_boost_prefers_matching_region() {
        // Two entries with identical content have identical embeddings, so
        // cosine scores are equal; only the boost separates them. The
        // untagged one comes first by insertion order without the boost.
        let shared = "आपदा क्षति मूल्यांकन सर्वेक्षण".to_string();
        let extra = vec![
            KnowledgeDoc {
                title: "untagged twin".to_string(),
                content: shared.clone(),
                source: None,
                disaster_type: None,
                region: None,
                language: None,
            },
            KnowledgeDoc {
                title: "regional twin".to_string(),
                content: shared.clone(),
                source: None,
                disaster_type: None,
                region: Some(HINDI_REGION.to_string()),
                language: None,
            },
        ];
        let engine = engine_with(extra);

        let result = engine.retrieve(&shared, DisasterType::Flood, 2);
        assert_eq!(result.entries[0].entry.metadata.title, "regional twin");
        assert!(result.entries[0].score > result.entries[1].score);
    }

    #[test]
    fn test_english_query_gets_no_boost() {
        let shared = "disaster assessment survey baseline".to_string();
        let extra = vec![
            KnowledgeDoc {
                title: "plain twin".to_string(),
                content: shared.clone(),
                source: None,
                disaster_type: None,
                region: None,
                language: None,
            },
            KnowledgeDoc {
                title: "regional twin".to_string(),
                content: shared.clone(),
                source: None,
                disaster_type: None,
                region: Some(HINDI_REGION.to_string()),
                language: None,
            },
        ];
        let engine = engine_with(extra);

        let result = engine.retrieve(&shared, DisasterType::Flood, 2);
        // Equal scores: insertion order breaks the tie
        assert_eq!(result.entries[0].entry.metadata.title, "plain twin");
        assert_eq!(result.entries[0].score, result.entries[1].score);
    }

    #[test]
    fn test_top_n_cap() {
        let engine = engine_with(vec![]);
        let result = engine.retrieve("assessment", DisasterType::Flood, 2);
        assert!(result.entries.len() <= 2);
    }
}
