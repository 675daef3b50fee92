use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// ResumeAnalysis — structured output of the deep resume analysis call
// ────────────────────────────────────────────────────────────────────────────

/// Candidate identity and headline extracted from the resume.
/// The struct itself is required in `ResumeAnalysis`; its fields are not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub business: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

/// Named entities pulled out of the resume for downstream question topics.
/// Required in `ResumeAnalysis` — an analysis without entities is unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

/// Immutable deep analysis of one resume, keyed by the SHA-256 of its text.
///
/// `candidate_profile` and `extracted_entities` are deliberately NOT
/// `#[serde(default)]`: an LLM response missing either is a hard failure,
/// not something to paper over with empty structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub candidate_profile: CandidateProfile,
    #[serde(default)]
    pub professional_summary: Option<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub key_achievements: Vec<String>,
    #[serde(default)]
    pub interview_focus_areas: Vec<String>,
    pub extracted_entities: ExtractedEntities,
}

// ────────────────────────────────────────────────────────────────────────────
// ProfileClassification — role category + planning signals
// ────────────────────────────────────────────────────────────────────────────

/// The 11 mutually exclusive role categories. A closed serde enum: any
/// classifier output outside this set fails deserialization, which is the
/// intended hard failure — downstream planning rules are category-keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    SoftwareDev,
    QaAutomationSdet,
    DataMl,
    DevopsSre,
    ProductManagement,
    DesignUx,
    SalesMarketing,
    FinanceAccounting,
    HrRecruiting,
    CustomerSupport,
    OperationsAdmin,
}

impl RoleCategory {
    pub const ALL: [RoleCategory; 11] = [
        RoleCategory::SoftwareDev,
        RoleCategory::QaAutomationSdet,
        RoleCategory::DataMl,
        RoleCategory::DevopsSre,
        RoleCategory::ProductManagement,
        RoleCategory::DesignUx,
        RoleCategory::SalesMarketing,
        RoleCategory::FinanceAccounting,
        RoleCategory::HrRecruiting,
        RoleCategory::CustomerSupport,
        RoleCategory::OperationsAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::SoftwareDev => "software_dev",
            RoleCategory::QaAutomationSdet => "qa_automation_sdet",
            RoleCategory::DataMl => "data_ml",
            RoleCategory::DevopsSre => "devops_sre",
            RoleCategory::ProductManagement => "product_management",
            RoleCategory::DesignUx => "design_ux",
            RoleCategory::SalesMarketing => "sales_marketing",
            RoleCategory::FinanceAccounting => "finance_accounting",
            RoleCategory::HrRecruiting => "hr_recruiting",
            RoleCategory::CustomerSupport => "customer_support",
            RoleCategory::OperationsAdmin => "operations_admin",
        }
    }

    /// One-line description of who falls into this category, rendered into
    /// the classification prompt.
    pub fn description(&self) -> &'static str {
        match self {
            RoleCategory::SoftwareDev => {
                "software engineers, backend/frontend/mobile developers"
            }
            RoleCategory::QaAutomationSdet => {
                "QA automation engineers, SDETs, test-infrastructure roles"
            }
            RoleCategory::DataMl => "data scientists, data engineers, ML engineers",
            RoleCategory::DevopsSre => {
                "DevOps engineers, SREs, platform/infrastructure engineers"
            }
            RoleCategory::ProductManagement => "product managers, product owners",
            RoleCategory::DesignUx => "product designers, UX researchers",
            RoleCategory::SalesMarketing => "sales, growth, and marketing roles",
            RoleCategory::FinanceAccounting => "finance, accounting, FP&A roles",
            RoleCategory::HrRecruiting => "HR generalists, recruiters, people operations",
            RoleCategory::CustomerSupport => "support, success, and service roles",
            RoleCategory::OperationsAdmin => {
                "operations, administration, program coordination"
            }
        }
    }

    /// Human-readable label for rationale strings.
    pub fn label(&self) -> &'static str {
        match self {
            RoleCategory::SoftwareDev => "Software Development",
            RoleCategory::QaAutomationSdet => "QA Automation / SDET",
            RoleCategory::DataMl => "Data / ML",
            RoleCategory::DevopsSre => "DevOps / SRE",
            RoleCategory::ProductManagement => "Product Management",
            RoleCategory::DesignUx => "Design / UX",
            RoleCategory::SalesMarketing => "Sales / Marketing",
            RoleCategory::FinanceAccounting => "Finance / Accounting",
            RoleCategory::HrRecruiting => "HR / Recruiting",
            RoleCategory::CustomerSupport => "Customer Support",
            RoleCategory::OperationsAdmin => "Operations / Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    Low,
    #[default]
    Medium,
    High,
}

/// Classification of one analyzed profile. `role_category` is required — an
/// unclassified profile cannot be safely planned, so there is no default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileClassification {
    pub role_category: RoleCategory,
    #[serde(default)]
    pub years_experience: f64,
    #[serde(default)]
    pub coding_expected: bool,
    #[serde(default)]
    pub recent_coding: bool,
    #[serde(default)]
    pub evidence_strength: EvidenceStrength,
    #[serde(default)]
    pub primary_languages: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    0.5
}
