//! Stored documents: users, answer records and their provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPARTMENT: &str = "DEPT_TECHNOLOGY";
pub const DEFAULT_ROLE: &str = "user";

/// A registered account. Only the bcrypt hash of the password is ever kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub department: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Outward view of a [`User`]; never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub department: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            department: user.department.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
        }
    }
}

/// Pipeline stages, in the only order they are ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Routing,
    Drafting,
    Verifying,
    Delivered,
}

impl StepName {
    pub const ORDER: [StepName; 4] = [
        StepName::Routing,
        StepName::Drafting,
        StepName::Verifying,
        StepName::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Routing => "routing",
            StepName::Drafting => "drafting",
            StepName::Verifying => "verifying",
            StepName::Delivered => "delivered",
        }
    }
}

pub const STEP_COMPLETE: &str = "complete";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineStep {
    pub step: StepName,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Audit metadata attached 1:1 to each answer. camelCase on the wire for the web client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub answered_by: String,
    pub verified_by: String,
    pub agent_code: String,
    pub agent_name: String,
    pub work_profile: String,
    pub checklist: String,
    pub rating: f32,
    pub timestamp: DateTime<Utc>,
}

/// One question/answer exchange (`chat_history` entry). Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerRecord {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub category: String,
    pub answer: String,
    pub provenance: Provenance,
    pub pipeline_steps: Vec<PipelineStep>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_drops_hash() {
        let user = User {
            id: "u1".into(),
            email: "a@go4garage.com".into(),
            password_hash: "$2b$12$secret".into(),
            name: "A".into(),
            department: DEFAULT_DEPARTMENT.into(),
            role: DEFAULT_ROLE.into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@go4garage.com");
    }

    #[test]
    fn provenance_serializes_camel_case() {
        let p = Provenance {
            answered_by: "SURYA".into(),
            verified_by: "GANESHA".into(),
            agent_code: "AG_SURYA".into(),
            agent_name: "SURYA".into(),
            work_profile: "WP_GENERAL_PARAGRAPH_V1.0".into(),
            checklist: "CL_GENERAL_V1.0".into(),
            rating: 4.8,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["answeredBy"], "SURYA");
        assert_eq!(json["workProfile"], "WP_GENERAL_PARAGRAPH_V1.0");
    }

    #[test]
    fn steps_serialize_lowercase() {
        assert_eq!(serde_json::to_value(StepName::Delivered).unwrap(), "delivered");
        assert_eq!(StepName::ORDER[0].as_str(), "routing");
    }
}
