//! Review evaluation and stage progression.

mod policy;
mod service;

pub use policy::{ConceptScreen, Grade, ReviewPolicy, Transition, Verdict};
pub use service::ReviewService;
