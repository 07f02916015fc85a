//! Integration test: the answer pipeline with fake generators, a real sled history
//! and a live notifier subscription.

use async_trait::async_trait;
use chrono::Utc;
use eka_core::{
    AnswerGenerator, AnswerLog, AnswerPipeline, AnswerRecord, ChatHistory, EkaError,
    GenerationError, GenerationRequest, Notifier, PipelineSettings, Room, ServerEvent, StepName,
    Store, User,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Echo {
    seen: Mutex<Vec<GenerationRequest>>,
}

#[async_trait]
impl AnswerGenerator for Echo {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(format!("answer to: {}", request.question))
    }
}

struct Failing;

#[async_trait]
impl AnswerGenerator for Failing {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Upstream(503, "overloaded".into()))
    }
}

struct Stalled;

#[async_trait]
impl AnswerGenerator for Stalled {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".into())
    }
}

struct BrokenLog;

#[async_trait]
impl AnswerLog for BrokenLog {
    async fn append(&self, _record: &AnswerRecord) -> eka_core::Result<()> {
        Err(EkaError::validation("disk full"))
    }
}

fn user() -> User {
    User {
        id: "u1".into(),
        email: "test@go4garage.com".into(),
        password_hash: "x".into(),
        name: "Test User".into(),
        department: "DEPT_TECHNOLOGY".into(),
        role: "user".into(),
        created_at: Utc::now(),
    }
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        generation_timeout: Duration::from_millis(200),
        persist_timeout: Duration::from_secs(2),
    }
}

fn history(dir: &tempfile::TempDir) -> Arc<ChatHistory> {
    let store = Store::open(Some(dir.path())).unwrap();
    Arc::new(ChatHistory::new(&store).unwrap())
}

fn step_names(record: &AnswerRecord) -> Vec<StepName> {
    record.pipeline_steps.iter().map(|s| s.step).collect()
}

#[tokio::test]
async fn urgaa_question_is_answered_by_surya() {
    let dir = tempfile::tempdir().unwrap();
    let log = history(&dir);
    let generator = Arc::new(Echo {
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = AnswerPipeline::new(generator.clone(), log.clone(), Notifier::new(), settings());

    let record = pipeline
        .ask(&user(), "What is the status of URGAA EV charging stations?", "URGAA")
        .await
        .unwrap();

    assert_eq!(record.provenance.agent_code, "AG_SURYA");
    assert_eq!(record.provenance.agent_name, "SURYA");
    assert_eq!(record.provenance.answered_by, "SURYA");
    assert_eq!(record.provenance.verified_by, "GANESHA");
    assert_eq!(record.provenance.work_profile, "WP_GENERAL_PARAGRAPH_V1.0");
    assert_eq!(record.provenance.checklist, "CL_GENERAL_V1.0");
    assert_eq!(record.provenance.rating, 4.8);
    assert_eq!(record.category, "URGAA");
    assert_eq!(step_names(&record), StepName::ORDER.to_vec());
    assert!(record.pipeline_steps.iter().all(|s| s.status == "complete"));
    assert_eq!(record.pipeline_steps[0].agent.as_deref(), Some("AG_SURYA"));
    assert_eq!(record.pipeline_steps[1].agent.as_deref(), Some("SURYA"));
    assert_eq!(record.pipeline_steps[2].agent.as_deref(), Some("GANESHA"));
    assert!(record.pipeline_steps[3].agent.is_none());
    assert!(record
        .pipeline_steps
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));

    let seen = generator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].instructions.contains("AG_SURYA"));
    assert!(seen[0].instructions.contains("DEPT_TECHNOLOGY"));
    drop(seen);

    let stored = log.list_for_user("u1", 50).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], record);
}

#[tokio::test]
async fn unknown_category_uses_the_default_pairing() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(Echo {
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = AnswerPipeline::new(generator, history(&dir), Notifier::new(), settings());

    let record = pipeline.ask(&user(), "Will it rain?", "Weather").await.unwrap();
    assert_eq!(record.provenance.agent_code, "AG_VISHNU");
    assert_eq!(record.provenance.work_profile, "WP_GENERAL_PARAGRAPH_V1.0");
    assert_eq!(record.category, "Weather");
}

#[tokio::test]
async fn generator_failure_degrades_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnswerPipeline::new(Arc::new(Failing), history(&dir), Notifier::new(), settings());

    let record = pipeline.ask(&user(), "Monthly revenue?", "Finance").await.unwrap();
    assert!(record.answer.starts_with("I apologize, but I was unable to generate a response right now"));
    assert!(record.answer.contains("503"));
    assert_eq!(step_names(&record), StepName::ORDER.to_vec());
    assert_eq!(record.provenance.work_profile, "WP_FINANCE_NUMERIC_V1.0");
}

#[tokio::test]
async fn generator_timeout_degrades_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnswerPipeline::new(Arc::new(Stalled), history(&dir), Notifier::new(), settings());

    let record = pipeline.ask(&user(), "Anything?", "Tech").await.unwrap();
    assert!(record.answer.contains("timed out"));
    assert_eq!(step_names(&record).last(), Some(&StepName::Delivered));
}

#[tokio::test]
async fn persistence_failure_does_not_fail_the_answer() {
    let generator = Arc::new(Echo {
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = AnswerPipeline::new(generator, Arc::new(BrokenLog), Notifier::new(), settings());

    let record = pipeline.ask(&user(), "hello", "All").await.unwrap();
    assert_eq!(record.answer, "answer to: hello");
}

#[tokio::test]
async fn blank_question_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnswerPipeline::new(Arc::new(Failing), history(&dir), Notifier::new(), settings());

    let err = pipeline.ask(&user(), "   ", "All").await.unwrap_err();
    assert!(matches!(err, EkaError::Validation(_)));
}

#[tokio::test]
async fn subscribers_receive_steps_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Notifier::new();
    let (conn, mut rx) = notifier.connect();
    notifier.subscribe(&conn, Room::Question("q-42".into()));
    let generator = Arc::new(Echo {
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = AnswerPipeline::new(generator, history(&dir), notifier.clone(), settings());

    let record = pipeline
        .ask_with_id(&user(), Some("q-42".into()), "status?", "Support")
        .await
        .unwrap();
    assert_ne!(record.id, "q-42");

    let mut steps = Vec::new();
    while steps.len() < 4 {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("pipeline update in time")
            .expect("channel open");
        if let ServerEvent::PipelineUpdate { question_id, step, .. } = event {
            assert_eq!(question_id, "q-42");
            steps.push(step);
        }
    }
    assert_eq!(steps, StepName::ORDER.to_vec());
}

#[tokio::test]
async fn repeated_question_id_keeps_record_ids_unique() {
    let dir = tempfile::tempdir().unwrap();
    let log = history(&dir);
    let generator = Arc::new(Echo {
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = AnswerPipeline::new(generator, log.clone(), Notifier::new(), settings());

    let first = pipeline
        .ask_with_id(&user(), Some("same".into()), "first?", "All")
        .await
        .unwrap();
    let second = pipeline
        .ask_with_id(&user(), Some("same".into()), "second?", "All")
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let stored = log.list_for_user("u1", 10).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
}
