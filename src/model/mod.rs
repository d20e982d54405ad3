pub mod backend;
pub mod config;
mod convert;
pub mod knowledge;
pub mod report;
pub mod request;

pub use config::{Config, KnowledgeDoc, PollConfig};
pub use convert::{dedup_capped, report_from_backend, MAX_AREAS, MAX_RECOMMENDATIONS};
pub use knowledge::*;
pub use report::*;
pub use request::*;
