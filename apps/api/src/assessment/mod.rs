//! Assessment lifecycle: resume intake through planning, question
//! generation, answer collection, and final evaluation.

pub mod handlers;
pub mod plan_store;
