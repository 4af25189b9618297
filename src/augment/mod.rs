//! Prompt augmentation: reranking, context formatting and prompt assembly.

pub mod format;
pub mod prompt;
pub mod rerank;

pub use format::{format_retrieved_context, format_retrieved_context_with, sanitize_for_prompt};
pub use prompt::{create_enhanced_rag_prompt, generate_query_specific_instructions};
pub use rerank::rerank_results;
