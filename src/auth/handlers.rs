use axum::{
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            AuthResponse, AuthStatus, ForgotPasswordRequest, LoginRequest, PublicUser,
            RefreshRequest, RegisterRequest, ResetIssued, ResetPasswordRequest, SearchQuery,
        },
        extractors::AuthUser,
        repo_types::User,
        services,
    },
    response::{created, done, ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/status", get(status))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/students/search", get(search_student))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiReply<PublicUser> {
    let user = services::register(&state, &payload.email, &payload.password).await?;
    created("Registration successful", PublicUser::from(&user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiReply<AuthResponse> {
    let user = services::login(&state, &payload.email, &payload.password).await?;
    ok("Login successful", services::issue_tokens(&state, &user)?)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiReply<AuthResponse> {
    ok(
        "Token refreshed",
        services::refresh(&state, &payload.refresh_token).await?,
    )
}

/// Tokens are stateless; the client drops them.
#[instrument]
pub async fn logout(user: Option<AuthUser>) -> ApiReply<()> {
    if let Some(AuthUser(user_id)) = user {
        info!(%user_id, "user logged out");
    }
    done("Logged out successfully")
}

#[instrument(skip(state, user))]
pub async fn status(State(state): State<AppState>, user: Option<AuthUser>) -> ApiReply<AuthStatus> {
    let user = match user {
        Some(AuthUser(id)) => User::find_by_id(&state.db, id).await,
        None => None,
    };
    let status = AuthStatus {
        logged_in: user.is_some(),
        user: user.as_ref().map(PublicUser::from),
    };
    ok("Authentication status", status)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> ApiReply<ResetIssued> {
    match services::request_password_reset(&state, &payload.email).await? {
        Some(token) => ok(
            "Password reset link generated successfully.",
            ResetIssued {
                token: Some(token.token),
                expires_at: Some(token.expires_at),
            },
        ),
        None => ok(
            "If an account exists with this email, a reset link has been generated.",
            ResetIssued {
                token: None,
                expires_at: None,
            },
        ),
    }
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> ApiReply<()> {
    services::reset_password(&state, &payload.token, &payload.new_password).await?;
    done("Password has been reset successfully. You can now login with your new password.")
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<PublicUser> {
    let user = services::current_user(&state, user_id).await?;
    ok("Current user", PublicUser::from(&user))
}

#[instrument(skip(state))]
pub async fn search_student(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(q): Query<SearchQuery>,
) -> ApiReply<PublicUser> {
    let user = services::search_by_email(&state, &q.email).await?;
    ok("Student found", PublicUser::from(&user))
}
