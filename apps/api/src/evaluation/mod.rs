//! Interview evaluation — component evaluators, the multi-LLM arbiter, and
//! the top-level interview evaluator with its deterministic backstop.

pub mod arbiter;
pub mod components;
pub mod evaluator;
pub mod models;
pub mod prompts;
