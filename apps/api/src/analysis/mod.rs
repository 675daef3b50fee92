//! Resume analysis — turns raw resume text into a structured `ResumeAnalysis`
//! (content-hash cached) and maps that analysis into a `ProfileClassification`.

pub mod analyzer;
pub mod cache;
pub mod classifier;
pub mod models;
pub mod prompts;
