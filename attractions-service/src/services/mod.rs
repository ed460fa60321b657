pub mod prompt;
pub mod providers;
pub mod recommender;
pub mod request_log;

pub use recommender::{RecommendError, RecommendationService};
pub use request_log::{AppendOutcome, ContextDocument, RequestLog};
