use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Server-side question types (full records, stored in the plan document)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceQuestion {
    pub id: Uuid,
    pub text: String,
    pub topic: String,
}

/// Full MCQ record including the correct answer. NEVER serialized into a
/// client response — use `McqQuestionClient` for that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub topic: String,
}

/// Full coding challenge including evaluation criteria. NEVER serialized into
/// a client response — use `CodingChallengeClient` for that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingChallenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub language: String,
    #[serde(default)]
    pub starter_code: Option<String>,
    pub evaluation_criteria: Vec<String>,
    pub time_limit_minutes: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Client-facing views (answers and rubrics stripped)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct McqQuestionClient {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub topic: String,
}

impl From<&McqQuestion> for McqQuestionClient {
    fn from(q: &McqQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            options: q.options.clone(),
            topic: q.topic.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CodingChallengeClient {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub language: String,
    pub starter_code: Option<String>,
    pub time_limit_minutes: u32,
}

impl From<&CodingChallenge> for CodingChallengeClient {
    fn from(c: &CodingChallenge) -> Self {
        Self {
            id: c.id,
            title: c.title.clone(),
            description: c.description.clone(),
            language: c.language.clone(),
            starter_code: c.starter_code.clone(),
            time_limit_minutes: c.time_limit_minutes,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw LLM output shapes (no ids — ids are assigned server-side)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeneratedVoiceBatch {
    #[serde(default)]
    pub questions: Vec<GeneratedVoiceQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedVoiceQuestion {
    pub text: String,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedMcqBatch {
    #[serde(default)]
    pub questions: Vec<GeneratedMcqQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedMcqQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub topic: Option<String>,
}

impl GeneratedMcqQuestion {
    /// Malformed items (wrong option count, out-of-range answer) are dropped
    /// and count toward the template top-up shortfall.
    pub fn is_valid(&self) -> bool {
        self.options.len() == 4 && self.correct_index < self.options.len()
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneratedChallengeBatch {
    #[serde(default)]
    pub challenges: Vec<GeneratedChallenge>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedChallenge {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub starter_code: Option<String>,
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcq_client_view_has_no_correct_index() {
        let q = McqQuestion {
            id: Uuid::new_v4(),
            question: "What does SQL stand for?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 2,
            topic: "databases".to_string(),
        };
        let client = McqQuestionClient::from(&q);
        let json = serde_json::to_string(&client).unwrap();
        assert!(!json.contains("correct_index"));
        assert!(json.contains("What does SQL stand for?"));
    }

    #[test]
    fn test_challenge_client_view_has_no_criteria() {
        let c = CodingChallenge {
            id: Uuid::new_v4(),
            title: "Rate limiter".to_string(),
            description: "Implement a token bucket".to_string(),
            language: "rust".to_string(),
            starter_code: None,
            evaluation_criteria: vec!["handles burst traffic".to_string()],
            time_limit_minutes: 45,
        };
        let json = serde_json::to_string(&CodingChallengeClient::from(&c)).unwrap();
        assert!(!json.contains("evaluation_criteria"));
        assert!(!json.contains("burst traffic"));
    }

    #[test]
    fn test_generated_mcq_validation() {
        let good = GeneratedMcqQuestion {
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 3,
            topic: None,
        };
        assert!(good.is_valid());

        let wrong_count = GeneratedMcqQuestion {
            options: vec!["a".into(), "b".into()],
            ..good_clone(&good)
        };
        assert!(!wrong_count.is_valid());

        let out_of_range = GeneratedMcqQuestion {
            correct_index: 4,
            ..good_clone(&good)
        };
        assert!(!out_of_range.is_valid());
    }

    fn good_clone(q: &GeneratedMcqQuestion) -> GeneratedMcqQuestion {
        GeneratedMcqQuestion {
            question: q.question.clone(),
            options: q.options.clone(),
            correct_index: q.correct_index,
            topic: q.topic.clone(),
        }
    }
}
