//! Building an image from local source: packaging the context directory and
//! following the remote build job to completion.

pub mod context;
pub mod orchestrator;

pub use context::{BuildArchive, PackError, pack, validate_dockerfile};
pub use orchestrator::{BuildError, BuildOrchestrator, BuildPhase, POLL_INTERVAL};
