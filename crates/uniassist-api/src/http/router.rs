//! Axum router configuration with middleware.
//!
//! Routes live under `/api/{user,chat,message,credit,guest}` plus the
//! payment webhook at `/api/stripe`. Middleware: CORS, tracing, body limit.
//!
//! When `server.web_dir` points at a built SPA, unknown paths fall through
//! to its `index.html` for client-side routing. If the directory does not
//! exist, only the API is served.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

fn user_routes() -> Router<AppState> {
    use handlers::user;
    Router::new()
        .route("/register", post(user::register))
        .route("/verify-otp", post(user::verify_otp))
        .route("/resend-otp", post(user::resend_otp))
        .route("/forgot-password", post(user::forgot_password))
        .route("/reset-password", post(user::reset_password))
        .route("/login", post(user::login))
        .route("/get", get(user::get_user))
}

fn chat_routes() -> Router<AppState> {
    use handlers::chat;
    Router::new()
        .route("/create", post(chat::create_chat))
        .route("/all", get(chat::list_chats))
        .route("/delete", delete(chat::delete_chat))
        .route("/rename", put(chat::rename_chat))
        .route("/clear", post(chat::clear_chat))
        .route("/{chat_id}", get(chat::get_chat))
        .route("/{chat_id}/stats", get(chat::chat_stats))
}

fn message_routes() -> Router<AppState> {
    use handlers::message;
    Router::new()
        .route("/text", post(message::text_message))
        .route("/email", post(message::email_message))
        .route("/voice", post(message::voice_message))
        .route("/health", get(message::message_health))
}

fn credit_routes() -> Router<AppState> {
    use handlers::credit;
    Router::new()
        .route("/plan", get(credit::list_plans))
        .route("/plans", get(credit::list_plans))
        .route("/purchase", post(credit::purchase))
        .route("/balance", get(credit::balance))
}

fn guest_routes() -> Router<AppState> {
    use handlers::guest;
    Router::new()
        .route("/chat", post(guest::guest_chat))
        .route("/voice", post(guest::guest_voice))
        .route("/email", post(guest::guest_email))
        .route("/history", get(guest::guest_history))
        .route("/clear", post(guest::guest_clear))
        .route("/health", get(guest::guest_health))
        .route("/cleanup", post(guest::guest_cleanup))
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.server.body_limit_bytes;
    let web_dir = state.config.server.web_dir.clone();

    let mut router = Router::new()
        .route("/", get(handlers::server::root))
        .route("/health", get(handlers::server::health))
        .route("/api/stripe", post(handlers::credit::stripe_webhook))
        .nest("/api/user", user_routes())
        .nest("/api/chat", chat_routes())
        .nest("/api/message", message_routes())
        .nest("/api/credit", credit_routes())
        .nest("/api/guest", guest_routes())
        // Voice notes arrive as base64 data URLs, well past axum's 2 MiB default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(web_dir) = web_dir.filter(|dir| dir.is_dir()) {
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(web_dir.join("index.html")));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir.display(), "SPA static file serving enabled");
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use uniassist_core::repository::user::UserRepository;
    use uniassist_core::service::token::TokenIssuer;
    use uniassist_infra::crypto::token::JwtTokenIssuer;
    use uniassist_types::user::User;

    use crate::state::tests::{TEST_JWT_SECRET, test_state};

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }

    /// A verified user and a token for it.
    async fn signed_in(state: &AppState, credits: i64) -> (User, String) {
        let now = chrono::Utc::now();
        let user = User {
            id: uniassist_types::user::UserId::new(),
            name: "Ayesha".to_string(),
            email: format!("ayesha{}@maju.edu.pk", uuid::Uuid::now_v7().simple()),
            password_hash: "unused".to_string(),
            credits,
            is_verified: true,
            verification: None,
            password_reset: None,
            created_at: now,
            updated_at: now,
        };
        let user = state.users.create(&user).await.unwrap();
        let issuer = JwtTokenIssuer::new(
            secrecy::SecretString::from(TEST_JWT_SECRET.to_string()),
            chrono::Duration::days(30),
        );
        let token = issuer.issue(&user.id).unwrap();
        (user, token)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let response = router.clone().oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"UniAssist Server is Live");

        let (status, body) = send(&router, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let (status, body) = send(&router, get_request("/api/user/get", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(&router, get_request("/api/chat/all", Some("Bearer garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bare_token_is_accepted() {
        let (state, _tmp) = test_state().await;
        let (user, token) = signed_in(&state, 100).await;
        let router = build_router(state);

        let (status, body) = send(&router, get_request("/api/user/get", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["_id"], user.id.to_string());
        assert_eq!(body["user"]["isVerified"], true);
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_chat_lifecycle() {
        let (state, _tmp) = test_state().await;
        let (_user, token) = signed_in(&state, 100).await;
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(Method::POST, "/api/chat/create", Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat Created");
        assert_eq!(body["chat"]["name"], "New Chat");
        let chat_id = body["chat"]["_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            json_request(
                Method::PUT,
                "/api/chat/rename",
                Some(&token),
                json!({ "chatId": chat_id, "name": "  Finals prep  " }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chat"]["name"], "Finals prep");

        let bearer = format!("Bearer {token}");
        let (status, body) = send(
            &router,
            get_request(&format!("/api/chat/{chat_id}/stats"), Some(&bearer)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalMessages"], 0);

        let (status, _) = send(
            &router,
            json_request(
                Method::DELETE,
                "/api/chat/delete",
                Some(&token),
                json!({ "chatId": chat_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, get_request(&format!("/api/chat/{chat_id}"), Some(&bearer))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CHAT_NOT_FOUND");

        let (_, body) = send(&router, get_request("/api/chat/all", Some(&bearer))).await;
        assert_eq!(body["chats"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_chat_id_is_not_found() {
        let (state, _tmp) = test_state().await;
        let (_user, token) = signed_in(&state, 100).await;
        let router = build_router(state);

        let (status, _) = send(
            &router,
            get_request("/api/chat/not-a-uuid", Some(&format!("Bearer {token}"))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_text_message_without_credits() {
        let (state, _tmp) = test_state().await;
        let (user, token) = signed_in(&state, 0).await;
        let chat = state
            .chat_service
            .create(&user, Default::default())
            .await
            .unwrap();
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/message/text",
                Some(&token),
                json!({ "chatId": chat.id, "prompt": "When do finals start?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["message"], "Insufficient credits");
    }

    #[tokio::test]
    async fn test_text_message_refunds_when_llm_unconfigured() {
        let (state, _tmp) = test_state().await;
        let (user, token) = signed_in(&state, 5).await;
        let chat = state
            .chat_service
            .create(&user, Default::default())
            .await
            .unwrap();
        let users = state.users.clone();
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/message/text",
                Some(&token),
                json!({ "chatId": chat.id, "prompt": "hello" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "AI_NOT_CONFIGURED");
        let reloaded = users.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.credits, 5);
    }

    #[tokio::test]
    async fn test_voice_rejects_non_data_url() {
        let (state, _tmp) = test_state().await;
        let (user, token) = signed_in(&state, 10).await;
        let chat = state
            .chat_service
            .create(&user, Default::default())
            .await
            .unwrap();
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/message/voice",
                Some(&token),
                json!({ "chatId": chat.id, "audioUrl": "https://example.com/a.mp3" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_plans_and_unconfigured_purchase() {
        let (state, _tmp) = test_state().await;
        let (_user, token) = signed_in(&state, 10).await;
        let router = build_router(state);

        for path in ["/api/credit/plan", "/api/credit/plans"] {
            let (status, body) = send(&router, get_request(path, None)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["plans"].as_array().unwrap().len(), 3);
        }

        let (status, _) = send(
            &router,
            json_request(
                Method::POST,
                "/api/credit/purchase",
                Some(&token),
                json!({ "planId": "gold" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/credit/purchase",
                Some(&token),
                json!({ "planId": "pro" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "PAYMENTS_NOT_CONFIGURED");

        let (status, body) = send(
            &router,
            get_request("/api/credit/balance", Some(&format!("Bearer {token}"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credits"], 10);
    }

    #[tokio::test]
    async fn test_webhook_requires_signature() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let (status, _) = send(
            &router,
            json_request(Method::POST, "/api/stripe", None, json!({ "type": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_guest_chat_falls_back_and_keeps_history() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/guest/chat",
                None,
                json!({ "message": "Where is the library?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["totalMessages"], 1);
        let session_id = body["sessionId"].as_str().unwrap().to_string();
        assert!(session_id.starts_with("guest_"));

        let (status, body) = send(
            &router,
            get_request(&format!("/api/guest/history?sessionId={session_id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messageCount"], 2);

        let (status, _) = send(
            &router,
            json_request(
                Method::POST,
                "/api/guest/clear",
                None,
                json!({ "sessionId": session_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &router,
            get_request(&format!("/api/guest/history?sessionId={session_id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, get_request("/api/guest/history", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forgot_password_rate_limit() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        // Missing email fails validation and counts against the client.
        for _ in 0..5 {
            let (status, _) = send(
                &router,
                json_request(Method::POST, "/api/user/forgot-password", None, json!({})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (status, body) = send(
            &router,
            json_request(Method::POST, "/api/user/forgot-password", None, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "RATE_LIMITED");
    }

    fn forgot_password_from(peer: [u8; 4], forwarded_for: &str) -> Request<Body> {
        let mut request = json_request(Method::POST, "/api/user/forgot-password", None, json!({}));
        request
            .headers_mut()
            .insert("x-forwarded-for", forwarded_for.parse().unwrap());
        request.extensions_mut().insert(axum::extract::ConnectInfo(
            std::net::SocketAddr::from((peer, 50_000)),
        ));
        request
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_is_still_rate_limited() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let mut statuses = Vec::new();
        for i in 0..20 {
            let request = forgot_password_from([198, 51, 100, 4], &format!("10.0.0.{i}"));
            let (status, _) = send(&router, request).await;
            statuses.push(status);
        }
        assert!(statuses[..5].iter().all(|s| *s == StatusCode::BAD_REQUEST));
        assert!(statuses[5..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));

        // A different peer has its own budget.
        let (status, _) = send(&router, forgot_password_from([198, 51, 100, 5], "10.0.0.1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trusted_proxy_keys_on_forwarded_for() {
        let (mut state, _tmp) = test_state().await;
        let mut config = (*state.config).clone();
        config.server.trust_proxy = true;
        state.config = std::sync::Arc::new(config);
        let router = build_router(state);

        for i in 0..10 {
            let request = forgot_password_from([198, 51, 100, 4], &format!("10.0.0.{i}"));
            let (status, _) = send(&router, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_concurrent_failures_do_not_exceed_limit() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let router = router.clone();
            tasks.push(tokio::spawn(async move {
                send(&router, forgot_password_from([198, 51, 100, 4], "10.0.0.1"))
                    .await
                    .0
            }));
        }
        let mut failed = 0;
        let mut limited = 0;
        for task in tasks {
            match task.await.unwrap() {
                StatusCode::BAD_REQUEST => failed += 1,
                StatusCode::TOO_MANY_REQUESTS => limited += 1,
                other => panic!("unexpected status {other}"),
            }
        }
        assert_eq!(failed, 5);
        assert_eq!(limited, 15);
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_register_then_login_requires_matching_password() {
        let (state, _tmp) = test_state().await;
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/user/register",
                None,
                json!({ "name": "Bilal", "email": "Bilal@MAJU.edu.pk", "password": "secret1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/user/login",
                None,
                json!({ "email": "bilal@maju.edu.pk", "password": "wrong-pass" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/user/login",
                None,
                json!({ "email": "bilal@maju.edu.pk", "password": "secret1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["email"], "bilal@maju.edu.pk");
    }
}
