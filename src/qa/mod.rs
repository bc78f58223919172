//! Question answering: retrieve context for a query, then compose an answer.
pub mod composer;
pub mod retriever;

pub use composer::AnswerComposer;
pub use retriever::{RetrievedContext, Retriever};
