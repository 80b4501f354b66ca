//! Best-effort answer assembly over optional external collaborators.
//!
//! The assembler runs one linear pipeline per request: validate the question,
//! gather citations from a structured passage store and a vector index (each
//! individually fault-tolerant), build a retrieval context, call the
//! generation service once, optionally run an enhancement pass, and apply
//! deterministic post-formatting. Every collaborator failure is converted to
//! degraded data at its call site via the policy table in [`policy`]; the only
//! error a caller can see is an invalid question.

mod adapters;
mod collaborators;
mod error;
mod format;
mod pipeline;
mod policy;
mod prompt;
mod types;

pub use adapters::{
    EnhancementAdapter, GenerationAdapter, StructuredStoreAdapter, VectorIndexAdapter,
};
pub use collaborators::{AnswerEnhancer, AnswerGenerator, PassageStore, VectorIndex};
pub use error::{AssembleError, CollaboratorError};
pub use pipeline::{AssembleOptions, Assembler};
pub use policy::{Collaborator, FallbackPolicy, fallback_for};
pub use types::{AnswerResult, Query, SourceCitation};
