pub mod assistant;
pub mod embedding;
pub mod export;
pub mod extractor;
pub mod images;
pub mod knowledge;
pub mod language;
pub mod orchestrator;
pub mod retrieval;
pub mod rng;
pub mod session;

pub use assistant::AssessmentAssistant;
pub use export::{ExportError, ExportService, ReportSnapshot};
pub use images::ImageStore;
pub use language::LanguagePreference;
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome, AnalysisTier, OrchestratorError};
pub use retrieval::RetrievalEngine;
pub use session::SessionStore;
