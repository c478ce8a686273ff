use async_trait::async_trait;
use bootflow_cloud::{
    ApplyEngine, ApplyFailure, ConfigUpdater, EnvironmentValidator, ExternalResult,
    FileStateStore, State, StateStore,
};
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Error type the fakes return, so tests can check it comes back untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeError(pub String);

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FakeError {}

#[derive(Default)]
pub struct FakeStateStore {
    pub set_calls: Mutex<Vec<State>>,
    /// Scripted `set` results by call order; missing entries succeed
    pub set_returns: Mutex<VecDeque<Option<FakeError>>>,
}

impl FakeStateStore {
    pub fn fail_set_on_call(&self, returns: Vec<Option<&str>>) {
        *self.set_returns.lock().unwrap() = returns
            .into_iter()
            .map(|r| r.map(|m| FakeError(m.to_string())))
            .collect();
    }

    pub fn set_count(&self) -> usize {
        self.set_calls.lock().unwrap().len()
    }

    pub fn set_received(&self, index: usize) -> State {
        self.set_calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl StateStore for FakeStateStore {
    async fn get(&self) -> ExternalResult<State> {
        Ok(self.set_calls.lock().unwrap().last().cloned().unwrap_or_default())
    }

    async fn set(&self, state: &State) -> ExternalResult<()> {
        self.set_calls.lock().unwrap().push(state.clone());
        match self.set_returns.lock().unwrap().pop_front().flatten() {
            Some(err) => Err(Box::new(err)),
            None => Ok(()),
        }
    }
}

/// What a failed apply reports about its partial state
#[derive(Clone)]
pub enum FakePartial {
    Unavailable,
    Recovered(State),
    RetrievalFails(String),
}

#[derive(Clone)]
pub enum ApplyScript {
    /// Return the received state unchanged
    Echo,
    Succeed(State),
    Fail(String, FakePartial),
}

pub struct FakeApplyEngine {
    pub calls: Mutex<Vec<State>>,
    pub script: Mutex<ApplyScript>,
}

impl Default for FakeApplyEngine {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(ApplyScript::Echo),
        }
    }
}

impl FakeApplyEngine {
    pub fn returns(&self, script: ApplyScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn received(&self) -> State {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ApplyEngine for FakeApplyEngine {
    async fn apply(&self, state: State) -> Result<State, ApplyFailure> {
        self.calls.lock().unwrap().push(state.clone());
        match self.script.lock().unwrap().clone() {
            ApplyScript::Echo => Ok(state),
            ApplyScript::Succeed(next) => Ok(next),
            ApplyScript::Fail(message, partial) => {
                let failure = ApplyFailure::new(FakeError(message));
                Err(match partial {
                    FakePartial::Unavailable => failure,
                    FakePartial::Recovered(state) => failure.with_partial_state(state),
                    FakePartial::RetrievalFails(message) => {
                        failure.with_retrieval_failure(FakeError(message))
                    }
                })
            }
        }
    }
}

#[derive(Default)]
pub struct FakeEnvironmentValidator {
    pub received: Mutex<Vec<State>>,
    pub error: Mutex<Option<String>>,
}

#[async_trait]
impl EnvironmentValidator for FakeEnvironmentValidator {
    async fn validate(&self, state: &State) -> ExternalResult<()> {
        self.received.lock().unwrap().push(state.clone());
        match self.error.lock().unwrap().clone() {
            Some(message) => Err(Box::new(FakeError(message))),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeConfigUpdater {
    pub received: Mutex<Vec<State>>,
    pub error: Mutex<Option<String>>,
}

#[async_trait]
impl ConfigUpdater for FakeConfigUpdater {
    async fn update(&self, state: &State) -> ExternalResult<()> {
        self.received.lock().unwrap().push(state.clone());
        match self.error.lock().unwrap().clone() {
            Some(message) => Err(Box::new(FakeError(message))),
            None => Ok(()),
        }
    }
}

/// File-backed store that also records what it was asked to write
pub struct RecordingFileStore {
    pub inner: FileStateStore,
    pub writes: Mutex<Vec<State>>,
}

impl RecordingFileStore {
    pub fn new(dir: &TempDir) -> Self {
        Self {
            inner: FileStateStore::new(dir.path()),
            writes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl StateStore for RecordingFileStore {
    async fn get(&self) -> ExternalResult<State> {
        self.inner.get().await
    }

    async fn set(&self, state: &State) -> ExternalResult<()> {
        self.writes.lock().unwrap().push(state.clone());
        self.inner.set(state).await
    }
}

/// Certificate, key and chain files on disk
pub struct CertFiles {
    _dir: TempDir,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub chain: PathBuf,
}

impl CertFiles {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert");
        let key = dir.path().join("key");
        let chain = dir.path().join("chain");
        std::fs::write(&cert, "some-cert").unwrap();
        std::fs::write(&key, "some-key").unwrap();
        std::fs::write(&chain, "some-chain").unwrap();
        Self {
            _dir: dir,
            cert,
            key,
            chain,
        }
    }
}
