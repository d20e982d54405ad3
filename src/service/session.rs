//! In-memory session state: completed analyses and conversation history
//!
//! Nothing here survives the process; reports persist only through export.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::RwLock;

use crate::client::ChatMessage;
use crate::model::{AnalysisResult, DisasterType};

/// Only the most recent analyses are retained
const MAX_ANALYSES: usize = 20;

#[derive(Default)]
struct SessionState {
    results: HashMap<String, AnalysisResult>,
    order: VecDeque<String>,
    history: Vec<ChatMessage>,
    active_disaster: Option<DisasterType>,
}

#[derive(Default)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis; evicts the oldest beyond the cap
    pub fn record(&self, result: AnalysisResult, disaster_type: DisasterType) {
        let mut state = self.state.write().expect("session lock");

        state.active_disaster = Some(disaster_type);
        state.order.push_back(result.id.clone());
        state.results.insert(result.id.clone(), result);

        while state.order.len() > MAX_ANALYSES {
            if let Some(evicted) = state.order.pop_front() {
                state.results.remove(&evicted);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<AnalysisResult> {
        self.state
            .read()
            .expect("session lock")
            .results
            .get(id)
            .cloned()
    }

    /// Most recently recorded analysis
    pub fn latest(&self) -> Option<AnalysisResult> {
        let state = self.state.read().expect("session lock");
        state
            .order
            .back()
            .and_then(|id| state.results.get(id))
            .cloned()
    }

    pub fn active_disaster(&self) -> Option<DisasterType> {
        self.state.read().expect("session lock").active_disaster
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.state.read().expect("session lock").history.clone()
    }

    pub fn push_history(&self, message: ChatMessage) {
        self.state
            .write()
            .expect("session lock")
            .history
            .push(message);
    }

    pub fn clear_history(&self) {
        self.state.write().expect("session lock").history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisSource, Severity, SeverityBasis};
    use chrono::Utc;

    fn result(id: &str) -> AnalysisResult {
        AnalysisResult {
            id: id.to_string(),
            damage_percentage: 10.0,
            severity: Severity::Low,
            severity_basis: SeverityBasis::Percentage,
            affected_areas: vec![],
            building_damage: vec![],
            road_damage: vec![],
            flooded_areas: vec![],
            vegetation_loss: vec![],
            recommendations: vec![],
            created_at: Utc::now(),
            source: AnalysisSource::Synthetic,
        }
    }

    #[test]
    fn test_latest_is_newest() {
        let store = SessionStore::new();
        store.record(result("a"), DisasterType::Flood);
        store.record(result("b"), DisasterType::Flood);
        assert_eq!(store.latest().unwrap().id, "b");
        assert!(store.get("a").is_some());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let store = SessionStore::new();
        for i in 0..=MAX_ANALYSES {
            store.record(result(&format!("r{}", i)), DisasterType::Flood);
        }
        assert!(store.get("r0").is_none());
        assert_eq!(store.latest().unwrap().id, format!("r{}", MAX_ANALYSES));
    }

    #[test]
    fn test_history_roundtrip() {
        let store = SessionStore::new();
        store.push_history(ChatMessage::user("hello"));
        store.push_history(ChatMessage::assistant("hi"));
        assert_eq!(store.history().len(), 2);
        store.clear_history();
        assert!(store.history().is_empty());
    }
}
