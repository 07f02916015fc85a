//! EKA-AI core library.
//! Credentials, category routing, the answer pipeline, chat history, workshop records
//! and the real-time notifier shared by the gateway binaries.

pub mod auth;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod generator;
pub mod history;
pub mod model;
pub mod notifier;
pub mod pipeline;
pub mod records;
pub mod routing;
pub mod store;

pub use auth::{AuthService, Claims, Registration, Session};
pub use config::GatewayConfig;
pub use error::{EkaError, Result};
pub use generator::{AnswerGenerator, ChatCompletionsGenerator, GenerationError, GenerationRequest};
pub use history::{AnswerLog, ChatHistory, HISTORY_LIMIT};
pub use model::{AnswerRecord, PipelineStep, Provenance, PublicUser, StepName, User};
pub use notifier::{ClientEvent, ConnectionId, Notifier, Room, ServerEvent};
pub use pipeline::{AnswerPipeline, GenerationOutcome, PipelineSettings};
pub use records::{JobCard, JobCardRequest, Part, Priority, Records, Ticket, TicketRequest};
pub use routing::{AgentIdentity, Category, WorkProfile, VERIFYING_AGENT};
pub use store::Store;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
