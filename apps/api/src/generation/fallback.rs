//! Deterministic fallback templates used when an LLM generation call returns
//! fewer items than requested, malformed JSON, or nothing at all.
//!
//! These are intentionally generic: reduced personalization is the accepted
//! cost of never stalling the pipeline on a provider failure.

use uuid::Uuid;

use crate::analysis::models::ProfileClassification;
use crate::generation::models::{CodingChallenge, McqQuestion, VoiceQuestion};
use crate::planner::ExperienceLevel;

/// Generic voice questions with distinct topics, cycled by slot index.
const VOICE_TEMPLATES: &[(&str, &str)] = &[
    (
        "Tell me about a recent project you are proud of and what your specific contribution was.",
        "recent projects",
    ),
    (
        "Describe a time you disagreed with a teammate about an approach. How was it resolved?",
        "collaboration",
    ),
    (
        "What is the hardest problem you have solved in your work so far, and how did you approach it?",
        "problem solving",
    ),
    (
        "When everything on your plate feels urgent, how do you decide what to do first?",
        "prioritization",
    ),
    (
        "Walk me through something new you learned recently and how you went about learning it.",
        "learning",
    ),
    (
        "Tell me about a mistake you made at work and what changed in how you operate afterwards.",
        "ownership",
    ),
    (
        "Where do you want to grow professionally over the next two years?",
        "career growth",
    ),
    (
        "Describe how you communicate progress and risks to people outside your immediate team.",
        "communication",
    ),
];

/// Generic knowledge questions with fixed, verifiable answers.
/// (question, [4 options], correct_index, topic)
const MCQ_TEMPLATES: &[(&str, [&str; 4], usize, &str)] = &[
    (
        "In version control, what does a 'merge conflict' indicate?",
        [
            "The repository is corrupted",
            "Two changes modified the same content and need manual resolution",
            "A branch was deleted remotely",
            "The commit history was rewritten",
        ],
        1,
        "version control",
    ),
    (
        "Which practice most directly reduces the risk of regressions when changing code?",
        [
            "Automated tests run before merging",
            "Longer release cycles",
            "Larger pull requests",
            "Manual deployment checklists",
        ],
        0,
        "testing",
    ),
    (
        "An HTTP 404 response means:",
        [
            "The server crashed",
            "The request was malformed",
            "The requested resource was not found",
            "Authentication is required",
        ],
        2,
        "http",
    ),
    (
        "Which of these is the main purpose of a database index?",
        [
            "Enforcing foreign keys",
            "Compressing table storage",
            "Encrypting sensitive columns",
            "Speeding up lookups on the indexed columns",
        ],
        3,
        "databases",
    ),
    (
        "In an agile process, a 'retrospective' is primarily for:",
        [
            "Reflecting on how the team works and what to improve",
            "Estimating upcoming work",
            "Demonstrating features to stakeholders",
            "Assigning individual blame for missed deadlines",
        ],
        0,
        "ways of working",
    ),
    (
        "What is the safest way to handle a secret such as an API key?",
        [
            "Commit it to the repository for reproducibility",
            "Inject it via environment or a secret manager, never source control",
            "Share it in team chat so everyone has access",
            "Embed it in client-side code",
        ],
        1,
        "security",
    ),
    (
        "A service-level objective (SLO) is best described as:",
        [
            "A marketing commitment to customers",
            "The maximum hardware budget for a service",
            "A target level of reliability measured over time",
            "An incident postmortem template",
        ],
        2,
        "reliability",
    ),
    (
        "Which statement about code review is most accurate?",
        [
            "It exists mainly to catch formatting issues",
            "It should only be done by managers",
            "It slows teams down with no measurable benefit",
            "It spreads knowledge and catches defects before they ship",
        ],
        3,
        "code review",
    ),
];

/// Generic coding challenges ordered easiest-first, cycled by slot index.
/// (title, description, criteria, entry_friendly, time_limit)
const CODE_TEMPLATES: &[(&str, &str, &[&str], bool, u32)] = &[
    (
        "Word frequency counter",
        "Read a block of text and print the 10 most frequent words with their counts, \
         ignoring case and punctuation. Ties may be broken arbitrarily.",
        &["correct tokenization", "case-insensitive counting", "clear top-N selection"],
        true,
        30,
    ),
    (
        "Flatten nested lists",
        "Given an arbitrarily nested list structure of integers, produce a flat list \
         preserving left-to-right order. Handle empty lists.",
        &["handles arbitrary depth", "preserves order", "no stack overflow on deep input"],
        true,
        30,
    ),
    (
        "LRU cache",
        "Implement a fixed-capacity least-recently-used cache with get and put \
         operations, both in O(1) average time.",
        &["O(1) get and put", "correct eviction order", "capacity edge cases"],
        false,
        45,
    ),
    (
        "Log interval merger",
        "Given a list of (start, end) timestamp intervals from service logs, merge all \
         overlapping intervals and return the merged set sorted by start time.",
        &["correct overlap detection", "sorted output", "adjacent-interval handling"],
        false,
        45,
    ),
];

/// Returns the first template whose topic is not already covered, cycling by
/// slot index when all topics are taken.
pub fn fallback_voice_question(slot: usize, asked_topics: &[String]) -> VoiceQuestion {
    let pick = VOICE_TEMPLATES
        .iter()
        .find(|(_, topic)| !asked_topics.iter().any(|t| t.eq_ignore_ascii_case(topic)))
        .unwrap_or(&VOICE_TEMPLATES[slot % VOICE_TEMPLATES.len()]);

    VoiceQuestion {
        id: Uuid::new_v4(),
        text: pick.0.to_string(),
        topic: pick.1.to_string(),
    }
}

pub fn fallback_mcq_question(slot: usize) -> McqQuestion {
    let (question, options, correct_index, topic) = &MCQ_TEMPLATES[slot % MCQ_TEMPLATES.len()];
    McqQuestion {
        id: Uuid::new_v4(),
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index: *correct_index,
        topic: topic.to_string(),
    }
}

pub fn fallback_code_challenge(
    slot: usize,
    classification: &ProfileClassification,
    level: ExperienceLevel,
) -> CodingChallenge {
    // Entry candidates only get the entry-friendly templates.
    let pool: Vec<_> = if level == ExperienceLevel::Entry {
        CODE_TEMPLATES.iter().filter(|t| t.3).collect()
    } else {
        CODE_TEMPLATES.iter().collect()
    };
    let (title, description, criteria, _, time_limit) = pool[slot % pool.len()];

    let language = classification
        .primary_languages
        .first()
        .cloned()
        .unwrap_or_else(|| "python".to_string());

    CodingChallenge {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        language,
        starter_code: None,
        evaluation_criteria: criteria.iter().map(|c| c.to_string()).collect(),
        time_limit_minutes: *time_limit,
    }
}
