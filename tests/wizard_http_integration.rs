//! Integration tests for the setup wizard over real HTTP.
//!
//! Each test spins up an Axum server on a random port that stands in for
//! the bot-provisioning API, then drives the wizard through `HttpBotApi`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use chatbot_setup::api::{
    DEFAULT_FALLBACK_MESSAGE, DEFAULT_SYSTEM_PROMPT, DEFAULT_WELCOME_MESSAGE, HttpBotApi,
};
use chatbot_setup::credentials::{CredentialProvider, StaticCredentials};
use chatbot_setup::error::{ApiError, Error};
use chatbot_setup::notify::CollectingNotifier;
use chatbot_setup::wizard::{SetupWizard, WizardStep, render};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const ACCESS_TOKEN: &str = "session-token";
const ORIGIN: &str = "https://bots.example.com";

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct MockApi {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockApi {
    fn record(&self, path: String, headers: &HeaderMap, body: &Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            path,
            authorization,
            body: body.clone(),
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}"))
}

fn bot_info(id: i64) -> Value {
    json!({
        "id": id,
        "username": "helper_bot",
        "first_name": "Helper",
        "can_join_groups": true,
        "can_read_all_group_messages": false,
        "supports_inline_queries": false,
        "premium_chatbot_ready": true,
        "setup_instructions": {
            "step_1": "Open Telegram Business settings",
            "step_2": "Choose Chatbots",
            "step_3": "Enter @helper_bot",
            "step_4": "Save"
        }
    })
}

async fn validate_token(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record("/api/v1/bots/validate-telegram-token".into(), &headers, &body);
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Not authenticated" })),
        )
            .into_response();
    }
    match body["bot_token"].as_str() {
        Some("123:ABC") => Json(json!({ "valid": true, "bot_info": bot_info(42) })).into_response(),
        Some("999:HTML") => Json(json!({ "valid": true, "bot_info": bot_info(13) })).into_response(),
        Some("500:HTML") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>").into_response()
        }
        Some("321:BARE") => {
            let mut info = bot_info(21);
            if let Some(fields) = info.as_object_mut() {
                fields.remove("setup_instructions");
            }
            Json(json!({ "valid": true, "bot_info": info })).into_response()
        }
        _ => Json(json!({ "valid": false, "error": "Invalid token: Unauthorized" })).into_response(),
    }
}

async fn create_bot(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record("/api/v1/bots".into(), &headers, &body);
    if body["name"] == "Taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Bot with this token already exists" })),
        )
            .into_response();
    }
    Json(json!({
        "id": 7,
        "name": body["name"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "platform": body["platform"],
        "is_active": true
    }))
    .into_response()
}

async fn setup_premium(
    State(mock): State<MockApi>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record(
        format!("/api/v1/bots/{id}/setup-premium-chatbot"),
        &headers,
        &body,
    );
    if id == 13 {
        return (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response();
    }
    Json(json!({ "success": true, "webhook_url": body["webhook_url"] })).into_response()
}

/// Start the mock API on a random port, return (base_url, mock).
async fn start_server() -> (String, MockApi) {
    let mock = MockApi::default();
    let app = Router::new()
        .route("/api/v1/bots/validate-telegram-token", post(validate_token))
        .route("/api/v1/bots", post(create_bot))
        .route("/api/v1/bots/{id}/setup-premium-chatbot", post(setup_premium))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), mock)
}

fn build_wizard(
    base_url: &str,
    credentials: Arc<dyn CredentialProvider>,
) -> (SetupWizard, Arc<CollectingNotifier>) {
    let api = HttpBotApi::new(base_url, credentials, Duration::from_secs(2)).unwrap();
    let notifier = Arc::new(CollectingNotifier::new());
    let wizard = SetupWizard::new(Arc::new(api), notifier.clone(), ORIGIN);
    (wizard, notifier)
}

fn session() -> Arc<dyn CredentialProvider> {
    Arc::new(StaticCredentials::new(ACCESS_TOKEN))
}

/// No session available.
struct NoSession;

impl CredentialProvider for NoSession {
    fn access_token(&self) -> Option<SecretString> {
        None
    }
}

#[tokio::test]
async fn end_to_end_setup() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());
        let created = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&created);
        let wizard = wizard.on_bot_created(move |bot| {
            assert_eq!(bot.id, 7);
            assert_eq!(bot.extra["is_active"], true);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        // Step 1
        wizard.edit_form(|f| f.set_bot_token("123:ABC")).await;
        let info = wizard.submit_token().await.unwrap();
        assert_eq!(info.id, 42);
        let step = wizard.step().await;
        assert_eq!(step.number(), 2);
        assert_eq!(step.bot_info().unwrap().id, 42);

        // Step 2
        wizard.edit_form(|f| f.bot_name = "Helper".into()).await;
        let bot = wizard.create_bot().await.unwrap();
        assert_eq!(bot.name, "Helper");
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(wizard.step().await.number(), 3);

        // Step 3
        let url = wizard.setup_premium_chatbot().await.unwrap();
        assert_eq!(url, "https://bots.example.com/api/v1/webhooks/telegram/42");
        assert!(matches!(wizard.step().await, WizardStep::Complete { .. }));

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert_eq!(
                request.authorization.as_deref(),
                Some("Bearer session-token"),
                "missing bearer on {}",
                request.path
            );
        }
        assert_eq!(requests[0].body, json!({ "bot_token": "123:ABC" }));

        let create = &requests[1].body;
        assert_eq!(create["name"], "Helper");
        assert_eq!(create["platform"], "telegram");
        assert_eq!(create["telegram_bot_token"], "123:ABC");
        assert_eq!(create["system_prompt"], DEFAULT_SYSTEM_PROMPT);
        assert_eq!(create["welcome_message"], DEFAULT_WELCOME_MESSAGE);
        assert_eq!(create["fallback_message"], DEFAULT_FALLBACK_MESSAGE);
        assert!(create.get("description").is_none());

        assert_eq!(requests[2].path, "/api/v1/bots/42/setup-premium-chatbot");
        assert_eq!(requests[2].body["webhook_url"], url);

        assert_eq!(
            notifier.successes(),
            vec![
                "Bot token validated successfully!",
                "Bot created successfully!",
                "Premium Chatbot setup completed!"
            ]
        );
        assert!(notifier.errors().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_token_keeps_step_one() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());

        wizard.edit_form(|f| f.set_bot_token("000:NOPE")).await;
        let err = wizard.submit_token().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Rejected { .. })));

        assert_eq!(wizard.step().await, WizardStep::ValidateToken);
        assert_eq!(notifier.errors(), vec!["Invalid token: Unauthorized"]);
        assert_eq!(mock.requests().len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn validation_server_error_uses_generic_message() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());

        wizard.edit_form(|f| f.set_bot_token("500:HTML")).await;
        let err = wizard.submit_token().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::InvalidResponse { .. })
        ));

        let state = wizard.snapshot().await;
        assert_eq!(state.step, WizardStep::ValidateToken);
        assert!(!state.is_validating);
        assert_eq!(notifier.errors(), vec!["Failed to validate bot token"]);
        assert_eq!(mock.requests().len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bot_info_without_setup_instructions_reaches_step_two() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, _mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());

        wizard.edit_form(|f| f.set_bot_token("321:BARE")).await;
        let info = wizard.submit_token().await.unwrap();
        assert_eq!(info.id, 21);
        assert!(info.setup_instructions.steps().iter().all(|s| s.is_empty()));

        let text = render(&wizard.snapshot().await);
        assert!(text.contains("ID: 21"));
        assert!(!text.contains("Telegram setup:"));
        assert!(notifier.errors().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_token_sends_nothing() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());

        assert!(matches!(
            wizard.submit_token().await.unwrap_err(),
            Error::Form(_)
        ));
        assert!(mock.requests().is_empty());
        assert!(notifier.notifications().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_session_is_reported_as_invalid_token() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, Arc::new(NoSession));

        wizard.edit_form(|f| f.set_bot_token("123:ABC")).await;
        assert!(wizard.submit_token().await.is_err());

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].authorization.is_none());
        assert_eq!(notifier.errors(), vec!["Invalid bot token"]);
        assert_eq!(wizard.step().await.number(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn creation_rejection_surfaces_server_detail() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, _mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());
        let created = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&created);
        let wizard = wizard.on_bot_created(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        wizard.edit_form(|f| f.set_bot_token("123:ABC")).await;
        wizard.submit_token().await.unwrap();
        wizard.edit_form(|f| f.bot_name = "Taken".into()).await;

        let err = wizard.create_bot().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Rejected { status: 400, .. })
        ));
        assert_eq!(notifier.errors(), vec!["Bot with this token already exists"]);
        assert_eq!(created.load(Ordering::SeqCst), 0);
        assert_eq!(wizard.step().await.number(), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn premium_setup_non_json_failure_uses_generic_message() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, mock) = start_server().await;
        let (wizard, notifier) = build_wizard(&base_url, session());

        wizard.edit_form(|f| f.set_bot_token("999:HTML")).await;
        wizard.submit_token().await.unwrap();
        wizard.create_bot().await.unwrap();

        let err = wizard.setup_premium_chatbot().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::InvalidResponse { .. })
        ));
        assert_eq!(notifier.errors(), vec!["Failed to setup Premium Chatbot"]);
        assert_eq!(wizard.step().await.number(), 3);
        assert_eq!(
            mock.requests().last().unwrap().path,
            "/api/v1/bots/13/setup-premium-chatbot"
        );
    })
    .await
    .expect("test timed out");
}
