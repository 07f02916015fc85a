//! Category router: maps a question category to the answering agent and the work
//! profile that shapes the draft. Pure and total; unknown categories fall through to
//! the general-purpose pairing.

use serde::Serialize;

/// Verifier recorded on every answer.
pub const VERIFYING_AGENT: &str = "GANESHA";

/// Category used when the client sends none.
pub const DEFAULT_CATEGORY: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    All,
    Products,
    Finance,
    Legal,
    Support,
    Tech,
    Urgaa,
    Gstsaas,
    Ignition,
    Arjun,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::All,
        Category::Products,
        Category::Finance,
        Category::Legal,
        Category::Support,
        Category::Tech,
        Category::Urgaa,
        Category::Gstsaas,
        Category::Ignition,
        Category::Arjun,
    ];

    /// Case-insensitive; surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Category> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Products => "Products",
            Category::Finance => "Finance",
            Category::Legal => "Legal",
            Category::Support => "Support",
            Category::Tech => "Tech",
            Category::Urgaa => "URGAA",
            Category::Gstsaas => "GSTSAAS",
            Category::Ignition => "IGNITION",
            Category::Arjun => "ARJUN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentIdentity {
    pub code: &'static str,
    pub name: &'static str,
}

impl AgentIdentity {
    const fn new(code: &'static str, name: &'static str) -> Self {
        Self { code, name }
    }
}

pub const DEFAULT_AGENT: AgentIdentity = AgentIdentity::new("AG_VISHNU", "VISHNU");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkProfile {
    FinanceNumeric,
    LegalBrief,
    SupportTable,
    GeneralParagraph,
}

impl WorkProfile {
    pub fn id(&self) -> &'static str {
        match self {
            WorkProfile::FinanceNumeric => "WP_FINANCE_NUMERIC_V1.0",
            WorkProfile::LegalBrief => "WP_LEGAL_BRIEF_V1.0",
            WorkProfile::SupportTable => "WP_SUPPORT_TABLE_V1.0",
            WorkProfile::GeneralParagraph => "WP_GENERAL_PARAGRAPH_V1.0",
        }
    }

    pub fn checklist(&self) -> &'static str {
        match self {
            WorkProfile::FinanceNumeric => "CL_FINANCE_V1.0",
            WorkProfile::LegalBrief => "CL_LEGAL_V1.0",
            WorkProfile::SupportTable => "CL_SUPPORT_V1.0",
            WorkProfile::GeneralParagraph => "CL_GENERAL_V1.0",
        }
    }

    /// Formatting guidance handed to the generator.
    pub fn guidance(&self) -> &'static str {
        match self {
            WorkProfile::FinanceNumeric => {
                "Lead with the key figures. Show amounts with currency and period, then a short interpretation."
            }
            WorkProfile::LegalBrief => {
                "Lead with the main risk and its severity. Keep it brief and cite the clause or obligation involved."
            }
            WorkProfile::SupportTable => {
                "Answer as a markdown table of steps or fields, followed by one line on the next action."
            }
            WorkProfile::GeneralParagraph => {
                "Answer in short plain paragraphs. No tables unless the user asks for one."
            }
        }
    }
}

pub fn agent_for(category: Option<Category>) -> AgentIdentity {
    match category {
        Some(Category::Urgaa) => AgentIdentity::new("AG_SURYA", "SURYA"),
        Some(Category::Gstsaas) => AgentIdentity::new("AG_VARUNA", "VARUNA"),
        Some(Category::Ignition) => AgentIdentity::new("AG_BRAHMA", "BRAHMA"),
        Some(Category::Arjun) => AgentIdentity::new("AG_SARASWATI", "SARASWATI"),
        Some(Category::Finance) => AgentIdentity::new("AG_LAKSHMI", "LAKSHMI"),
        Some(Category::Legal) => AgentIdentity::new("AG_YAMA", "YAMA"),
        Some(Category::Support) => AgentIdentity::new("AG_KUBERA", "KUBERA"),
        Some(Category::Tech) => AgentIdentity::new("AG_VISHWAKARMA", "VISHWAKARMA"),
        Some(Category::All) | Some(Category::Products) | None => DEFAULT_AGENT,
    }
}

pub fn work_profile_for(category: Option<Category>) -> WorkProfile {
    match category {
        Some(Category::Finance) => WorkProfile::FinanceNumeric,
        Some(Category::Legal) => WorkProfile::LegalBrief,
        Some(Category::Support) | Some(Category::Gstsaas) => WorkProfile::SupportTable,
        Some(Category::All)
        | Some(Category::Products)
        | Some(Category::Tech)
        | Some(Category::Urgaa)
        | Some(Category::Ignition)
        | Some(Category::Arjun)
        | None => WorkProfile::GeneralParagraph,
    }
}

pub fn resolve_agent(category: &str) -> AgentIdentity {
    agent_for(Category::parse(category))
}

pub fn resolve_work_profile(category: &str) -> WorkProfile {
    work_profile_for(Category::parse(category))
}
