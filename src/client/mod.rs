//! HTTP clients for the two consumed remote services

pub mod narrative;
pub mod vision;

pub use narrative::{ChatMessage, NarrativeClient, NarrativeError};
pub use vision::{VisionClient, VisionError};
