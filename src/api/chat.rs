//! Conversational endpoints

use crate::api::ApiError;
use crate::core::error::Error;
use crate::core::traits::{AdminChatService, ChatService};
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", post(client_chat))
}

pub fn admin_router() -> Router {
    Router::new().route("/", post(admin_chat))
}

async fn client_chat(
    Inject(chat): Inject<dyn ChatService>,
    Json(body): Json<schemas::ClientChatRequest>,
) -> Result<Json<schemas::ChatReply>, ApiError> {
    let (client_id, message) = match (body.client_id, body.message) {
        (Some(client_id), Some(message)) => (client_id, message),
        _ => return Err(Error::validation("clientId and message are required").into()),
    };

    let reply = chat.respond(&client_id, &message).await?;
    Ok(Json(schemas::ChatReply { reply }))
}

async fn admin_chat(
    Inject(chat): Inject<dyn AdminChatService>,
    Json(body): Json<schemas::AdminChatRequest>,
) -> Result<Json<schemas::ChatReply>, ApiError> {
    let (admin_id, message) = match (body.admin_id, body.message) {
        (Some(admin_id), Some(message)) => (admin_id, message),
        _ => return Err(Error::validation("adminId and message are required").into()),
    };

    let reply = chat.respond(&admin_id, &message).await?;
    Ok(Json(schemas::ChatReply { reply }))
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ClientChatRequest {
        pub client_id: Option<String>,
        pub message: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminChatRequest {
        pub admin_id: Option<String>,
        pub message: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatReply {
        pub reply: String,
    }
}
