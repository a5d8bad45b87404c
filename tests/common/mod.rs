#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use blog::{
    AppState,
    auth::PasswordHasher,
    db,
    notify::{Notifier, NotifyError},
    session::SessionStore,
    storage::{ObjectStore, StorageError},
};
use chrono::Duration;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Keeps uploads in memory; can be told to refuse them.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 403,
                body: "AccessDenied".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("https://bucket.test/{key}"))
    }
}

/// Records every publish; can be told to fail them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), message.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected(500));
        }
        Ok(())
    }
}

pub struct TestApp {
    _dir: TempDir,
    pub state: AppState,
    pub storage: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("blog.db").display());
        let pool = db::connect(&url).await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        let storage = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState {
            pool,
            sessions: SessionStore::new("test-secret", Duration::hours(1)),
            hasher: PasswordHasher::new(4),
            storage: storage.clone(),
            notifier: notifier.clone(),
        };
        let router = blog::routes::router(state.clone());

        Self {
            _dir: dir,
            state,
            storage,
            notifier,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Response<Body> {
        let body = format!("name={name}&email={email}&password={password}");
        self.post_form("/signup", &body, None).await
    }

    /// Log in and return the `Cookie` header value for later requests.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form("/login", &format!("email={email}&password={password}"), None)
            .await;
        assert_eq!(location(&response), "/dashboard");
        session_cookie(&response).expect("login sets a session cookie")
    }

    pub async fn register_and_login(&self, name: &str, email: &str, password: &str) -> String {
        assert_eq!(location(&self.signup(name, email, password).await), "/login");
        self.login(email, password).await
    }

    pub async fn create_post(&self, cookie: &str, title: &str, content: &str) {
        let response = self
            .post_form(
                "/create",
                &format!("title={title}&content={content}"),
                Some(cookie),
            )
            .await;
        assert_eq!(location(&response), "/dashboard");
    }

    pub async fn dashboard(&self, cookie: &str) -> serde_json::Value {
        json(self.get("/dashboard", Some(cookie)).await).await
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_string)
}

pub async fn json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn multipart(field: &str, filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "blog-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
