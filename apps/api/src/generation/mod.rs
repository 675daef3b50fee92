//! Question/challenge generators — one per assessment component.
//!
//! Each generator makes one LLM call sized per the plan and tops up any
//! shortfall with deterministic templates, so a generation failure can
//! degrade quality but never stall the pipeline.

pub mod code;
pub mod fallback;
pub mod mcq;
pub mod models;
pub mod prompts;
pub mod voice;
