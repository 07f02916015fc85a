use axum::extract::State;
use axum::Json;
use eka_core::{PublicUser, Registration, Session};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: PublicUser,
}

impl From<Session> for TokenResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.token,
            token_type: "bearer",
            user: PublicUser::from(&session.user),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Registration>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.auth.register(body).await?;
    Ok(Json(session.into()))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(session.into()))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}
