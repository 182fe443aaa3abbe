//! AI entity extraction gate: Claude messages client, prompt construction,
//! deterministic JSON repair, and output sanitisation.

pub mod client;
pub mod error;
pub mod gate;
pub mod prompt;
pub mod repair;
pub mod types;

pub use client::ClaudeClient;
pub use error::AnalyzeError;
pub use gate::{sanitise, AnalysisBackend, ExtractionGate};
pub use types::{Analysis, RawAnalysis, SearchDigest};
