//! Mock backends and fake voice capabilities for the control tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use campaign_types::CallLogSubmission;
use campaign_voice::{
    ElementHandle, InjectedControlDom, PersistError, Persister, RunConfig, ScriptHost, ScriptTag,
    SdkEvent, SdkInbox, SdkSession, VoiceSdk,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A scripted reply from a mock backend.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

/// Records request bodies and answers with a fixed reply.
pub struct MockBackend {
    reply: Reply,
    requests: Mutex<Vec<Value>>,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(State(backend): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    backend.requests.lock().unwrap().push(body);
    (backend.reply.status, Json(backend.reply.body.clone())).into_response()
}

/// Serves `route` on an ephemeral port. Returns the base URL.
pub async fn spawn_backend(route: &str, reply: Reply) -> (String, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend {
        reply,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route(route, post(answer))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

/// A document whose scripts load instantly and attach the SDK.
pub struct InstantHost {
    sdk: Arc<FakeSdk>,
    loads: bool,
}

impl InstantHost {
    pub fn new(sdk: Arc<FakeSdk>, loads: bool) -> Arc<Self> {
        Arc::new(Self { sdk, loads })
    }
}

#[async_trait]
impl ScriptHost for InstantHost {
    fn inject(&self, src: &str) -> ScriptTag {
        ScriptTag::new(src)
    }

    async fn wait_loaded(&self, _tag: &ScriptTag) -> Result<(), String> {
        if self.loads {
            Ok(())
        } else {
            Err("net::ERR_CONNECTION_REFUSED".to_string())
        }
    }

    fn remove(&self, _tag: &ScriptTag) {}

    fn sdk(&self) -> Option<Arc<dyn VoiceSdk>> {
        if self.loads {
            let sdk: Arc<dyn VoiceSdk> = self.sdk.clone();
            Some(sdk)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct FakeSdk {
    inbox: Mutex<Option<SdkInbox>>,
    runs: Mutex<usize>,
}

impl FakeSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn emit(&self, event: SdkEvent) {
        if let Some(inbox) = self.inbox.lock().unwrap().as_ref() {
            inbox.send(event).unwrap();
        }
    }

    pub fn runs(&self) -> usize {
        *self.runs.lock().unwrap()
    }
}

struct NoopSession;

impl SdkSession for NoopSession {
    fn stop(&self) {}
}

impl VoiceSdk for FakeSdk {
    fn run(&self, _config: &RunConfig, inbox: SdkInbox) -> Result<Box<dyn SdkSession>, String> {
        *self.runs.lock().unwrap() += 1;
        *self.inbox.lock().unwrap() = Some(inbox);
        Ok(Box::new(NoopSession))
    }
}

/// Accepts every call record without any I/O.
pub struct AcceptingPersister;

#[async_trait]
impl Persister for AcceptingPersister {
    async fn persist(&self, call_id: &str) -> Result<CallLogSubmission, PersistError> {
        Ok(CallLogSubmission::new(call_id, json!({ "id": call_id })))
    }
}

/// A page where the SDK has already injected its control.
#[derive(Default)]
pub struct ControlDom {
    present: AtomicBool,
}

impl ControlDom {
    pub fn with_control() -> Arc<Self> {
        Arc::new(Self {
            present: AtomicBool::new(true),
        })
    }
}

impl InjectedControlDom for ControlDom {
    fn locate(&self, _selectors: &[&str]) -> Option<ElementHandle> {
        self.present
            .load(Ordering::SeqCst)
            .then(|| ElementHandle(".vapi-btn".to_string()))
    }

    fn adopt(&self, _control: &ElementHandle) -> bool {
        true
    }
}
