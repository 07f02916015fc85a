use axum::extract::State;
use axum::Json;
use eka_core::routing::DEFAULT_CATEGORY;
use eka_core::{AnswerRecord, HISTORY_LIMIT};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Lets the client subscribe to `question:{id}` before the answer comes back.
    #[serde(default)]
    pub question_id: Option<String>,
}

pub async fn ask(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AskRequest>,
) -> Result<Json<AnswerRecord>, ApiError> {
    let record = state
        .pipeline
        .ask_with_id(&user, body.question_id, &body.question, &body.category)
        .await?;
    Ok(Json(record))
}

pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AnswerRecord>>, ApiError> {
    let records = state.history.list_for_user(&user.id, HISTORY_LIMIT).await?;
    Ok(Json(records))
}
