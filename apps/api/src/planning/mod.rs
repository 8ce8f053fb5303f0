// Transformation planning: fit scoring, plan building, manual swaps.
// Scoring and building are pure and synchronous; only the service touches storage.

pub mod builder;
pub mod error;
pub mod fit_scoring;
pub mod handlers;
pub mod mutator;
pub mod service;

pub use error::PlanError;
pub use fit_scoring::CapacityFitScorer;
pub use service::PlanningService;
