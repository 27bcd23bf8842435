//! Fake capabilities shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use campaign_types::CallLogSubmission;
use campaign_voice::{
    ElementHandle, InjectedControlDom, PersistError, Persister, RunConfig, ScriptHost, ScriptTag,
    SdkEvent, SdkInbox, SdkSession, VoiceSdk,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PRIMARY: &str = "https://primary.example/sdk.js";
pub const FALLBACK: &str = "https://fallback.example/sdk.js";

/// How a fake script element behaves once injected.
#[derive(Debug, Clone, Copy)]
pub enum ScriptBehavior {
    /// Fires `load` after `delay`; attaches the SDK handle first if `attaches`.
    Load { delay: Duration, attaches: bool },
    /// Fires `error` after `delay`.
    Fail { delay: Duration },
    /// Never settles.
    Hang,
}

pub fn loads_with_handle(ms: u64) -> ScriptBehavior {
    ScriptBehavior::Load {
        delay: Duration::from_millis(ms),
        attaches: true,
    }
}

pub fn fails(ms: u64) -> ScriptBehavior {
    ScriptBehavior::Fail {
        delay: Duration::from_millis(ms),
    }
}

/// A document that records injected scripts and holds the SDK global.
pub struct FakeHost {
    sdk: Arc<FakeSdk>,
    behaviors: Mutex<HashMap<String, ScriptBehavior>>,
    document: Mutex<Vec<ScriptTag>>,
    injected: Mutex<Vec<String>>,
    handle: Mutex<Option<Arc<dyn VoiceSdk>>>,
    probes: AtomicUsize,
}

impl FakeHost {
    pub fn new(sdk: Arc<FakeSdk>) -> Arc<Self> {
        Arc::new(Self {
            sdk,
            behaviors: Mutex::new(HashMap::new()),
            document: Mutex::new(Vec::new()),
            injected: Mutex::new(Vec::new()),
            handle: Mutex::new(None),
            probes: AtomicUsize::new(0),
        })
    }

    pub fn on(&self, src: &str, behavior: ScriptBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(src.to_string(), behavior);
    }

    pub fn attach_sdk(&self) {
        let sdk: Arc<dyn VoiceSdk> = self.sdk.clone();
        *self.handle.lock().unwrap() = Some(sdk);
    }

    pub fn attach_sdk_after(self: &Arc<Self>, delay: Duration) {
        let host = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            host.attach_sdk();
        });
    }

    /// Sources of the script elements currently in the document.
    pub fn live_scripts(&self) -> Vec<String> {
        self.document
            .lock()
            .unwrap()
            .iter()
            .map(|tag| tag.src().to_string())
            .collect()
    }

    /// Every source ever injected, in order.
    pub fn injected(&self) -> Vec<String> {
        self.injected.lock().unwrap().clone()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptHost for FakeHost {
    fn inject(&self, src: &str) -> ScriptTag {
        let tag = ScriptTag::new(src);
        self.document.lock().unwrap().push(tag.clone());
        self.injected.lock().unwrap().push(src.to_string());
        tag
    }

    async fn wait_loaded(&self, tag: &ScriptTag) -> Result<(), String> {
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(tag.src())
            .copied()
            .unwrap_or(ScriptBehavior::Hang);

        match behavior {
            ScriptBehavior::Load { delay, attaches } => {
                tokio::time::sleep(delay).await;
                if attaches {
                    self.attach_sdk();
                }
                Ok(())
            }
            ScriptBehavior::Fail { delay } => {
                tokio::time::sleep(delay).await;
                Err("net::ERR_NAME_NOT_RESOLVED".to_string())
            }
            ScriptBehavior::Hang => std::future::pending().await,
        }
    }

    fn remove(&self, tag: &ScriptTag) {
        self.document.lock().unwrap().retain(|t| t != tag);
    }

    fn sdk(&self) -> Option<Arc<dyn VoiceSdk>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.handle.lock().unwrap().clone()
    }
}

/// An SDK that records `run` calls and lets the test emit events.
#[derive(Default)]
pub struct FakeSdk {
    runs: Mutex<Vec<RunConfig>>,
    inbox: Mutex<Option<SdkInbox>>,
    stops: Arc<AtomicUsize>,
    run_error: Mutex<Option<String>>,
}

impl FakeSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_runs_with(&self, message: &str) {
        *self.run_error.lock().unwrap() = Some(message.to_string());
    }

    /// Pushes an event the way an SDK callback would.
    pub fn emit(&self, event: SdkEvent) {
        let inbox = self.inbox.lock().unwrap();
        inbox
            .as_ref()
            .expect("sdk must be running before it can emit")
            .send(event)
            .expect("console inbox should be open");
    }

    pub fn runs(&self) -> Vec<RunConfig> {
        self.runs.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    stops: Arc<AtomicUsize>,
}

impl SdkSession for FakeSession {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

impl VoiceSdk for FakeSdk {
    fn run(&self, config: &RunConfig, inbox: SdkInbox) -> Result<Box<dyn SdkSession>, String> {
        if let Some(message) = self.run_error.lock().unwrap().clone() {
            return Err(message);
        }
        self.runs.lock().unwrap().push(config.clone());
        *self.inbox.lock().unwrap() = Some(inbox);
        Ok(Box::new(FakeSession {
            stops: Arc::clone(&self.stops),
        }))
    }
}

/// Scripted result for [`RecordingPersister`].
#[derive(Debug, Clone, Copy)]
pub enum PersistScript {
    Saved,
    StoreRejects(u16),
    VendorRejects(u16),
}

/// Records every call id it is asked to persist.
pub struct RecordingPersister {
    calls: Mutex<Vec<String>>,
    script: PersistScript,
}

impl RecordingPersister {
    pub fn new(script: PersistScript) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            script,
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Persister for RecordingPersister {
    async fn persist(&self, call_id: &str) -> Result<CallLogSubmission, PersistError> {
        self.calls.lock().unwrap().push(call_id.to_string());
        match self.script {
            PersistScript::Saved => Ok(CallLogSubmission::new(
                call_id,
                json!({ "id": call_id, "status": "ended" }),
            )),
            PersistScript::StoreRejects(status) => Err(PersistError::StoreRejected(status)),
            PersistScript::VendorRejects(status) => Err(PersistError::VendorRejected {
                status,
                body: "call not found".to_string(),
            }),
        }
    }
}

/// A page where the SDK's control can appear and vanish, with the host
/// container always mounted.
#[derive(Default)]
pub struct FakeDom {
    present: AtomicBool,
    adopted: AtomicUsize,
}

impl FakeDom {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn show_control(&self) {
        self.present.store(true, Ordering::SeqCst);
    }

    pub fn remove_control(&self) {
        self.present.store(false, Ordering::SeqCst);
    }

    pub fn adopted(&self) -> usize {
        self.adopted.load(Ordering::SeqCst)
    }
}

impl InjectedControlDom for FakeDom {
    fn locate(&self, _selectors: &[&str]) -> Option<ElementHandle> {
        self.present
            .load(Ordering::SeqCst)
            .then(|| ElementHandle("vapi-support-btn".to_string()))
    }

    fn adopt(&self, _control: &ElementHandle) -> bool {
        self.adopted.fetch_add(1, Ordering::SeqCst);
        true
    }
}
