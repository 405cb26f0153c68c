//! Chat pipeline for the Mevzuat Assistant.
//!
//! Orchestrates one question-answering turn: classification, parallel
//! retrieval, context assembly, streamed answer synthesis, and citation
//! extraction. Also owns the session-scoped conversation state and the
//! feedback sink interface.

pub mod feedback;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod synthesize;

// Re-export commonly used types
pub use feedback::{FeedbackEntry, FeedbackSink, Rating, SqliteFeedbackSink};
pub use pipeline::{Pipeline, PipelineOptions, TurnOutcome, DEGRADED_MESSAGE, NO_RESULTS_MESSAGE};
pub use session::{ConversationTurn, SessionContext, TurnRole, HISTORY_WINDOW};
pub use synthesize::synthesize;
