use async_trait::async_trait;
use dawa_auth::{AuthApi, AuthError, AuthStore, CredentialField, AUTH_STORAGE_KEY};
use dawa_cache::Cache;
use dawa_commerce::checkout::OrderHistory;
use dawa_data::{
    ApiClient, FetchError, OrdersApi, RequestBuilder, Response, RetryPolicy, TokenStore, Transport,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Response>>,
    sent: Mutex<Vec<RequestBuilder>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Response>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<RequestBuilder> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        self.sent.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FetchError::Connection("no scripted response".into()))
    }
}

fn login_response() -> Response {
    Response::json_body(
        200,
        &json!({
            "user": {"id": 7, "name": "Amina Hassan", "email": "amina@example.co.ke", "is_admin": false},
            "accessToken": "a1",
            "refreshToken": "r1"
        }),
    )
}

fn setup(cache: Cache, responses: Vec<Response>) -> (AuthApi, OrdersApi, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new(responses);
    let store = Arc::new(AuthStore::load(cache));
    let client = ApiClient::new("https://api.example.test", transport.clone())
        .unwrap()
        .with_tokens(store.clone())
        .with_retry(RetryPolicy::none());
    (
        AuthApi::new(client.clone(), store),
        OrdersApi::new(client),
        transport,
    )
}

#[tokio::test]
async fn test_login_then_authorized_history_call() {
    let (auth, orders, transport) = setup(
        Cache::memory(),
        vec![
            login_response(),
            Response::json_body(
                200,
                &json!({"status": "success", "data": {"orders": [], "pagination": {"page": 1, "limit": 10, "total": 0, "totalPages": 1}}}),
            ),
        ],
    );

    let user = auth.login("amina@example.co.ke", "correct horse").await.unwrap();
    assert_eq!(user.first_name(), "Amina");
    assert!(auth.store().is_authenticated());

    let page = orders.list_orders(1, 10).await.unwrap();
    assert!(page.orders.is_empty());
    assert!(!page.pagination.has_next());

    let sent = transport.sent();
    assert_eq!(sent[0].url(), "https://api.example.test/api/auth/login");
    assert_eq!(sent[0].header_value("Authorization"), None);
    assert_eq!(sent[1].header_value("Authorization"), Some("Bearer a1"));
}

#[tokio::test]
async fn test_rejected_login_keeps_signed_out() {
    let (auth, _, _) = setup(
        Cache::memory(),
        vec![Response::json_body(401, &json!({"status": "error", "message": "Invalid credentials"}))],
    );

    let err = auth.login("amina@example.co.ke", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(err.is_auth_failure());
    assert!(!auth.store().is_authenticated());
}

#[tokio::test]
async fn test_rejected_relogin_keeps_current_session() {
    let cache = Cache::memory();
    let (auth, _, transport) = setup(
        cache.clone(),
        vec![
            login_response(),
            Response::json_body(401, &json!({"status": "error", "message": "Invalid credentials"})),
        ],
    );
    auth.login("amina@example.co.ke", "correct horse").await.unwrap();

    let err = auth.login("amina@example.co.ke", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(transport.sent().len(), 2);
    assert!(auth.store().is_authenticated());
    assert_eq!(auth.store().user().map(|u| u.id), Some(7));
    assert!(AuthStore::load(cache).is_authenticated());
}

#[tokio::test]
async fn test_invalid_form_makes_no_call() {
    let (auth, _, transport) = setup(Cache::memory(), vec![]);

    let err = auth.signup("", "amina@example.co.ke", "short").await.unwrap_err();
    let AuthError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert!(errors.contains(CredentialField::Name));
    assert!(errors.contains(CredentialField::Password));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_signup_rejection_carries_server_message() {
    let (auth, _, _) = setup(
        Cache::memory(),
        vec![Response::json_body(409, &json!({"status": "error", "message": "Email already registered"}))],
    );

    let err = auth
        .signup("Amina", "amina@example.co.ke", "long enough")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to sign up: Email already registered");
}

#[tokio::test]
async fn test_failed_refresh_clears_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::open_dir(dir.path()).unwrap();
    let (auth, orders, _) = setup(
        cache.clone(),
        vec![
            login_response(),
            Response::json_body(401, &json!({"status": "error", "message": "expired"})),
            Response::json_body(401, &json!({"status": "error", "message": "refresh expired"})),
        ],
    );
    auth.login("amina@example.co.ke", "correct horse").await.unwrap();
    assert!(cache.exists(AUTH_STORAGE_KEY).unwrap());

    let err = orders.list_orders(1, 10).await.unwrap_err();
    assert!(err.requires_login());
    assert!(!auth.store().is_authenticated());

    let reopened = AuthStore::load(Cache::open_dir(dir.path()).unwrap());
    assert!(!reopened.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let (auth, _, transport) = setup(
        Cache::memory(),
        vec![
            login_response(),
            Response::new(500, Default::default(), b"boom".to_vec()),
        ],
    );
    auth.login("amina@example.co.ke", "correct horse").await.unwrap();

    auth.logout().await.unwrap();
    assert!(!auth.store().is_authenticated());
    assert_eq!(transport.sent()[1].url(), "https://api.example.test/api/auth/logout");
}

#[tokio::test]
async fn test_explicit_refresh_rotates_tokens() {
    let (auth, _, _) = setup(
        Cache::memory(),
        vec![
            login_response(),
            Response::json_body(200, &json!({"status": "success", "data": {"accessToken": "a2"}})),
        ],
    );
    auth.login("amina@example.co.ke", "correct horse").await.unwrap();

    auth.refresh().await.unwrap();
    assert_eq!(auth.store().access_token().as_deref(), Some("a2"));
    assert_eq!(auth.store().refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_refresh_when_signed_out() {
    let (auth, _, _) = setup(Cache::memory(), vec![]);
    assert!(matches!(auth.refresh().await, Err(AuthError::NotAuthenticated)));
}
