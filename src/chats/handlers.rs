use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ChatIdRequest, ChatView, CreateChatRequest, LeaveChatResponse, SendMessageRequest},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    response::{ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat/create", post(create_chat))
        .route("/chat/join", post(join_chat))
        .route("/chat/leave", post(leave_chat))
        .route("/chat/send", post(send_message))
        .route("/chat/receive", post(receive_chat))
        .route("/chat/list", get(list_chats))
}

fn require_chat_id(id: Option<Uuid>) -> AppResult<Uuid> {
    id.ok_or_else(|| AppError::validation("Chat id is required"))
}

#[instrument(skip(state, payload))]
pub async fn create_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateChatRequest>,
) -> ApiReply<ChatView> {
    let chat = services::create_chat(&state, user_id, &payload.name, &payload.members).await?;
    ok("Chat created successfully!", services::view(&state, chat).await)
}

#[instrument(skip(state, payload))]
pub async fn join_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ChatIdRequest>,
) -> ApiReply<ChatView> {
    let chat_id = require_chat_id(payload.chat_id)?;
    let chat = services::join_chat(&state, user_id, chat_id).await?;
    ok("Chat joined successfully!", services::view(&state, chat).await)
}

#[instrument(skip(state, payload))]
pub async fn leave_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ChatIdRequest>,
) -> ApiReply<LeaveChatResponse> {
    let chat_id = require_chat_id(payload.chat_id)?;
    let remaining = services::leave_chat(&state, user_id, chat_id).await?;
    let chat = match remaining {
        Some(chat) => Some(services::view(&state, chat).await),
        None => None,
    };
    ok(
        "Chat left successfully!",
        LeaveChatResponse {
            chat_deleted: chat.is_none(),
            chat,
        },
    )
}

#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<SendMessageRequest>,
) -> ApiReply<ChatView> {
    let chat_id = require_chat_id(payload.chat_id)?;
    let chat = services::send_message(&state, user_id, chat_id, &payload.message).await?;
    ok("Message sent successfully!", services::view(&state, chat).await)
}

#[instrument(skip(state, payload))]
pub async fn receive_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ChatIdRequest>,
) -> ApiReply<ChatView> {
    let chat_id = require_chat_id(payload.chat_id)?;
    let chat = services::get_chat(&state, user_id, chat_id).await?;
    ok("Chat received successfully!", services::view(&state, chat).await)
}

#[instrument(skip(state))]
pub async fn list_chats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Vec<ChatView>> {
    let mut views = Vec::new();
    for chat in services::list_user_chats(&state, user_id).await {
        views.push(services::view(&state, chat).await);
    }
    ok("Chats listed successfully!", views)
}
