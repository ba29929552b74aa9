use axum::{extract::FromRequest, http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppError;

/// JSON body extractor whose rejection renders as the failure envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Success envelope: `{success, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type ApiReply<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

pub fn ok<T>(message: impl Into<String>, data: T) -> ApiReply<T> {
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }),
    ))
}

pub fn created<T>(message: impl Into<String>, data: T) -> ApiReply<T> {
    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }),
    ))
}

pub fn done(message: impl Into<String>) -> ApiReply<()> {
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message: Some(message.into()),
            data: None,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let (_, Json(body)) = done("Logged out successfully").unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out successfully");
        assert!(json.get("data").is_none());
    }
}
