pub mod orchestrator;

pub use orchestrator::{CleanupOutcome, Orchestrator, RunReport, RunStatus};
