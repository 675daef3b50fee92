// All LLM prompt constants for the generation module.

/// System prompt for voice question generation.
pub const VOICE_SYSTEM: &str =
    "You are an expert interviewer designing spoken interview questions \
    tailored to one candidate. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Batched voice question prompt.
/// Replace: {count}, {role}, {level}, {skills}, {focus_areas}
pub const VOICE_BATCH_TEMPLATE: &str = r#"Generate {count} spoken interview questions for this candidate.

Candidate:
- Role category: {role}
- Experience level: {level}
- Key skills: {skills}
- Interview focus areas: {focus_areas}

Return a JSON object:
{
  "questions": [
    {"text": "Walk me through a production incident you owned end to end.", "topic": "incident response"}
  ]
}

Rules:
- Exactly {count} questions.
- Each question must be answerable out loud in 2-3 minutes.
- Cover distinct topics — no two questions on the same theme.
- Calibrate depth to the {level} level."#;

/// Single-slot voice question prompt, used when the batch came up short.
/// Replace: {role}, {level}, {asked_questions}, {asked_topics}
pub const VOICE_SINGLE_TEMPLATE: &str = r#"Generate ONE additional spoken interview question for a {level}-level {role} candidate.

Questions already asked (do NOT repeat or rephrase these):
{asked_questions}

Topics already covered (pick a different one):
{asked_topics}

Return a JSON object:
{"text": "the question", "topic": "its topic"}"#;

/// System prompt for MCQ generation.
pub const MCQ_SYSTEM: &str =
    "You are an expert assessment author writing multiple-choice questions. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// MCQ batch prompt. Replace: {count}, {role}, {level}, {skills}
pub const MCQ_TEMPLATE: &str = r#"Generate {count} multiple-choice questions for a {level}-level {role} candidate.

Candidate's key skills to draw topics from: {skills}

Return a JSON object:
{
  "questions": [
    {
      "question": "Which HTTP status code indicates a client-side validation failure?",
      "options": ["200", "301", "400", "500"],
      "correct_index": 2,
      "topic": "http"
    }
  ]
}

Rules:
- Exactly {count} questions, each with EXACTLY 4 options.
- `correct_index` is the 0-based index of the single correct option.
- Mix difficulty around the {level} level.
- No trick questions; one unambiguous correct answer each."#;

/// System prompt for coding challenge generation.
pub const CODE_SYSTEM: &str =
    "You are an expert technical interviewer designing practical coding \
    challenges. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Coding challenge prompt.
/// Replace: {count}, {role}, {level}, {languages}, {skills}
pub const CODE_TEMPLATE: &str = r#"Generate {count} coding challenges for a {level}-level {role} candidate.

Preferred languages: {languages}
Candidate's key skills: {skills}

Return a JSON object:
{
  "challenges": [
    {
      "title": "Sliding-window rate limiter",
      "description": "Implement a rate limiter that allows N requests per rolling minute...",
      "language": "rust",
      "starter_code": "fn allow(request_time: u64) -> bool { todo!() }",
      "evaluation_criteria": ["correct window arithmetic", "O(1) memory per client"],
      "time_limit_minutes": 45
    }
  ]
}

Rules:
- Exactly {count} challenges, solvable in 30-60 minutes each.
- Calibrate to the {level} level.
- `evaluation_criteria` lists 2-4 concrete things a reviewer should check.
- Prefer the candidate's languages; default to a mainstream language otherwise."#;
