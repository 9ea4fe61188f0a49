//! Natural-language analytics over real-estate transaction records.
//!
//! Pipeline: query text → location extraction + intent classification →
//! location-filtered subset → aggregation → {narrative rendering, response
//! assembly}. The narrative prefers an LLM strategy and falls back to
//! deterministic templates.

pub mod aggregate;
pub mod analyst;
pub mod dataset;
pub mod error;
pub mod format;
pub mod intent;
pub mod llm;
pub mod locations;
pub mod response;
pub mod summary;
