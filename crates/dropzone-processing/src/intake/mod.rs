//! File intake: list state and the orchestrator that mutates it

pub mod orchestrator;
pub mod state;

pub use orchestrator::{BatchOutcome, IntakeOrchestrator};
pub use state::ListState;
