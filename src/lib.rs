//! # docqa - Document Question-Answering Service
//!
//! Upload a PDF or plain-text document, then ask questions answered by a
//! language model from the most relevant parts of that document.
//!
//! ## Architecture
//!
//! - **[`config`]**: Configuration loading, validation, and API key resolution
//! - **[`error`]**: Error taxonomy and HTTP status mapping
//! - **[`indexer`]**: Text extraction, overlapping chunking, and ingestion
//! - **[`embedder`]**: Text embedding (OpenAI API, deterministic mock)
//! - **[`store`]**: In-memory vector index and the live index generation
//! - **[`qa`]**: Retrieval and prompt composition
//! - **[`llm`]**: Answer generation (OpenAI API, echo mock)
//! - **[`server`]**: axum router with `/upload`, `/chat` and `/health`

pub mod config;
pub mod embedder;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod qa;
pub mod server;
pub mod store;
