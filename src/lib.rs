//! # prompt-rag
//!
//! Retrieval-augmented system prompts for a chat application. The latest
//! user message is classified, supporting documents are fetched from a
//! hosted retrieval service (or a static fallback set when the service is
//! unavailable), and the formatted documents are spliced into the system
//! prompt before it reaches the language model.
//!
//! ## Pipeline
//!
//! ```text
//!                     ┌──────────────────────┐
//!                     │ System prompt + chat │
//!                     └──────────┬───────────┘
//!                                │ last user message
//!                                ▼
//!                     ┌──────────────────────┐
//!                     │   Classification     │
//!                     │ greeting → skip      │
//!                     │ question → top 5     │
//!                     │ instruction → top 4  │
//!                     └──────────┬───────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!       ┌──────────────────┐          ┌──────────────────┐
//!       │  Original query  │          │ Expansion query  │
//!       │ ceil(k × 0.7)    │          │ ceil(k × 0.5)    │
//!       │                  │          │ score × 0.8      │
//!       └────────┬─────────┘          └────────┬─────────┘
//!                │  backend or fallback        │
//!                └──────────────┬──────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │ Merge, dedupe, keep k   │
//!                  └────────────┬────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │ Rerank + format context │
//!                  └────────────┬────────────┘
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │    Enhanced prompt      │
//!                  └─────────────────────────┘
//! ```
//!
//! Any step that has nothing to contribute hands back the original prompt.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the retrieval backend
//! - [`models`] - Shared data types: messages, retrieval options/results, `RagConfig`
//! - [`classify`] - Ordered rule table mapping a query to a `RagConfig`
//! - [`retrieval`] - Backend adapters, fallback dataset, query expansion and dedup
//! - [`augment`] - Reranking, context formatting and prompt assembly
//! - [`orchestrator`] - `RagEnhancer`, the entry point tying the pipeline together

pub mod augment;
pub mod classify;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod retrieval;

pub use orchestrator::RagEnhancer;
