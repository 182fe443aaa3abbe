//! The signal pipeline: entity resolution, merging, signal assembly, and
//! per-source sync orchestration.

pub mod assembler;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod sync;

pub use assembler::{assemble, SignalSeed};
pub use error::PipelineError;
pub use resolver::{resolve_company, resolve_person, ResolvedCompany};
pub use sync::{
    sync_github, sync_hackernews, sync_jobs, sync_producthunt, sync_reddit, sync_yc, SyncReport,
};
