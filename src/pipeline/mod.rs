// Resolution pipeline: name candidates, per-record resolution, batch orchestration

pub mod normalize;
pub mod orchestrator;
pub mod quality_gate;
pub mod resolver;

pub use normalize::name_candidates;
pub use orchestrator::{BatchOrchestrator, BatchOutcome};
pub use resolver::Resolver;
