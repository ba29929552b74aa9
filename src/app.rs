use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, chats, friends, groups, notifications, profiles, schedules};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profiles::router())
                .merge(groups::router())
                .merge(friends::router())
                .merge(chats::router())
                .merge(notifications::router())
                .merge(schedules::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        app: Router,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let state = AppState::fake(dir.path()).await;
            Self {
                app: build_app(state),
                _dir: dir,
            }
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(t) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
            }
            let req = match body {
                Some(b) => req
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(b.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };
            let res = self.app.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            self.call(Method::POST, uri, token, Some(body)).await
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            self.call(Method::GET, uri, token, None).await
        }

        /// Register and log in, returning the access token and user id.
        async fn signup(&self, email: &str) -> (String, String) {
            let body = json!({"email": email, "password": "Passw0rd!"});
            let (status, _) = self.post("/api/auth/register", None, body.clone()).await;
            assert_eq!(status, StatusCode::CREATED);
            let (status, res) = self.post("/api/auth/login", None, body).await;
            assert_eq!(status, StatusCode::OK);
            (
                res["data"]["access_token"].as_str().unwrap().to_string(),
                res["data"]["user"]["id"].as_str().unwrap().to_string(),
            )
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let res = app
            .app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "Not logged in"}));

        let (status, _) = app.get("/api/group/list", Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        app.signup("a@uni.edu").await;
        let creds = json!({"email": "a@uni.edu", "password": "Passw0rd!"});
        let (_, login) = app.post("/api/auth/login", None, creds).await;
        let refresh = login["data"]["refresh_token"].as_str().unwrap();
        let (status, body) = app.get("/api/me", Some(refresh)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access token required");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = TestApp::new().await;
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid JSON format");
    }

    #[tokio::test]
    async fn register_login_and_status() {
        let app = TestApp::new().await;
        let (token, id) = app.signup("a@uni.edu").await;

        let (status, body) = app
            .post(
                "/api/auth/register",
                None,
                json!({"email": "A@uni.edu", "password": "Passw0rd!"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = app
            .post(
                "/api/auth/login",
                None,
                json!({"email": "a@uni.edu", "password": "nope"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (_, body) = app.get("/api/auth/status", Some(&token)).await;
        assert_eq!(body["data"]["logged_in"], true);
        assert_eq!(body["data"]["user"]["id"], id.as_str());
        let (_, body) = app.get("/api/auth/status", None).await;
        assert_eq!(body["data"]["logged_in"], false);

        let (status, body) = app.get("/api/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "a@uni.edu");
        assert!(body["data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn password_reset_over_http() {
        let app = TestApp::new().await;
        app.signup("a@uni.edu").await;

        let (status, body) = app
            .post("/api/auth/forgot-password", None, json!({"email": "a@uni.edu"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 43);

        let reset = json!({"token": token, "new_password": "N3wPassword"});
        let (status, _) = app.post("/api/auth/reset-password", None, reset.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.post("/api/auth/reset-password", None, reset).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid or expired reset token");

        let (_, body) = app
            .post("/api/auth/forgot-password", None, json!({"email": "ghost@uni.edu"}))
            .await;
        assert_eq!(body["success"], true);
        assert!(body["data"].get("token").is_none());
    }

    #[tokio::test]
    async fn group_lifecycle_scenario() {
        let app = TestApp::new().await;
        let (first, _) = app.signup("a@uni.edu").await;
        let (second, second_id) = app.signup("b@uni.edu").await;

        let (status, body) = app
            .post(
                "/api/group/create",
                Some(&first),
                json!({"name": "CS", "specified_class": ["CS101"], "study_times": "Mon 10:00"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let group_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["specified_class"], "CS101");

        let (status, body) = app
            .post("/api/group/join", Some(&second), json!({"group_id": group_id}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["member_emails"], json!(["a@uni.edu", "b@uni.edu"]));

        let (status, body) = app
            .post("/api/group/join", Some(&second), json!({"group_id": "CS"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User already in the group");

        let (_, body) = app
            .post("/api/group/leave", Some(&first), json!({"group_id": group_id}))
            .await;
        assert_eq!(body["data"]["group_deleted"], false);
        assert_eq!(body["data"]["group"]["owner_id"], second_id.as_str());
        assert_eq!(body["data"]["group"]["members"], json!([second_id]));

        let (_, body) = app
            .post("/api/group/leave", Some(&second), json!({"group_id": group_id}))
            .await;
        assert_eq!(body["data"]["group_deleted"], true);

        let (_, body) = app.get("/api/group/listall", Some(&first)).await;
        assert_eq!(body["data"], json!([]));
        let (_, body) = app.get("/api/chat/list", Some(&second)).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn friendship_opens_direct_chat() {
        let app = TestApp::new().await;
        let (a, _) = app.signup("a@uni.edu").await;
        let (b, _) = app.signup("b@uni.edu").await;

        let (status, _) = app
            .post("/api/friend/request", Some(&a), json!({"email": "b@uni.edu"}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/friend/requests", Some(&b)).await;
        let request_id = body["data"]["received"][0]["request_id"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, _) = app
            .post("/api/friend/accept", Some(&b), json!({"request_id": request_id}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/chat/list", Some(&a)).await;
        let chat = &body["data"][0];
        assert_eq!(chat["kind"], "direct");
        let chat_id = chat["chat_id"].as_str().unwrap().to_string();

        let (status, _) = app
            .post(
                "/api/chat/send",
                Some(&a),
                json!({"chat_id": chat_id, "message": "hi"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = app
            .post("/api/chat/receive", Some(&b), json!({"chat_id": chat_id}))
            .await;
        assert_eq!(body["data"]["messages"][0]["body"], "hi");

        let (_, body) = app.get("/api/notifications", Some(&b)).await;
        assert!(!body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_and_schedule_endpoints() {
        let app = TestApp::new().await;
        let (token, _) = app.signup("a@uni.edu").await;

        let (status, _) = app.get("/api/profile", Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .post(
                "/api/profile/upload",
                Some(&token),
                json!({"name": "Ada", "major": "CS", "availability": ["Mon", "Mon"]}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["availability"], json!(["Mon"]));

        let (status, body) = app
            .post(
                "/api/profile/preferences",
                Some(&token),
                json!({"day": 8, "start": 9, "end": 10}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Day must be between 0 and 6");

        let (status, body) = app
            .post(
                "/api/study_schedule/create",
                Some(&token),
                json!({"session_name": "Prep", "start_date": "2025-03-01T09:00", "end_date": "2025-03-01T10:00"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"][0]["id"].as_str().unwrap().to_string();

        let (_, body) = app.get("/api/study_schedule/get", Some(&token)).await;
        assert_eq!(body["data"][0]["start_time"], "2025-03-01T09:00");

        let (status, _) = app
            .post("/api/study_schedule/delete", Some(&token), json!({"id": id}))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
