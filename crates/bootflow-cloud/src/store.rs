//! State persistence
//!
//! [`FileStateStore`] manages `bootflow-state.json` inside the state
//! directory, keeping the previous copy as a backup and guarding concurrent
//! CLI invocations with an advisory lock file.

use crate::error::{ExternalResult, StoreError};
use crate::state::{STATE_VERSION, State};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const STATE_FILE: &str = "bootflow-state.json";
const STATE_BACKUP: &str = "bootflow-state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Durable home of the environment record
///
/// Callers always pass the complete snapshot; there are no partial updates.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self) -> ExternalResult<State>;
    async fn set(&self, state: &State) -> ExternalResult<()>;
}

/// JSON state file in a directory
pub struct FileStateStore {
    state_dir: PathBuf,
}

impl FileStateStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir.join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<(), StoreError> {
        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir).await?;
            tracing::debug!("Created state directory: {}", self.state_dir.display());
        }
        Ok(())
    }

    /// Load the current state. A missing file is the empty state.
    pub async fn load(&self) -> Result<State, StoreError> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(State::default());
        }

        let content = fs::read_to_string(&path).await?;
        let state: State = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(StoreError::VersionTooNew {
                found: state.version,
                supported: STATE_VERSION,
            });
        }

        tracing::debug!(env_id = %state.env_id, "Loaded state");
        Ok(state)
    }

    /// Save `state`, moving the previous file to the backup path first.
    pub async fn save(&self, state: &State) -> Result<(), StoreError> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            let current = self.load().await?;
            if !current.env_id.is_empty()
                && !state.env_id.is_empty()
                && current.env_id != state.env_id
            {
                return Err(StoreError::EnvIdChanged {
                    current: current.env_id,
                    requested: state.env_id.clone(),
                });
            }
            // iaas is fixed once an apply has produced engine state
            if !current.tf_state.is_empty()
                && !current.iaas.is_empty()
                && current.iaas != state.iaas
            {
                return Err(StoreError::IaasChanged {
                    current: current.iaas,
                    requested: state.iaas.clone(),
                });
            }

            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let versioned = State {
            version: STATE_VERSION,
            ..state.clone()
        };
        let content = serde_json::to_string_pretty(&versioned)?;
        fs::write(&path, content).await?;

        tracing::debug!(env_id = %state.env_id, "Saved state");
        Ok(())
    }

    /// Take the advisory lock on this state directory for `command`.
    ///
    /// A lock older than [`LOCK_STALE_AFTER_MINUTES`] is taken over.
    pub async fn acquire_lock(&self, command: &str) -> Result<StateLock, StoreError> {
        self.ensure_state_dir().await?;
        let lock_path = self.lock_path();

        if let Some(held) = LockInfo::read(&lock_path).await? {
            if !held.is_stale(Utc::now()) {
                return Err(StoreError::Locked {
                    holder: held.describe(),
                    since: held.acquired_at.to_rfc3339(),
                });
            }
            tracing::warn!(
                holder = %held.describe(),
                acquired_at = %held.acquired_at,
                "taking over abandoned state lock"
            );
        }

        let info = LockInfo::current(command);
        fs::write(&lock_path, serde_json::to_string_pretty(&info)?).await?;
        tracing::debug!(pid = info.pid, command, "state lock taken");

        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self) -> ExternalResult<State> {
        Ok(self.load().await?)
    }

    async fn set(&self, state: &State) -> ExternalResult<()> {
        Ok(self.save(state).await?)
    }
}

pub const LOCK_STALE_AFTER_MINUTES: i64 = 60;

/// Contents of `lock.json`
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    host: String,
    pid: u32,
    #[serde(default)]
    command: String,
    acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn current(command: &str) -> Self {
        Self {
            host: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            command: command.to_string(),
            acquired_at: Utc::now(),
        }
    }

    async fn read(path: &Path) -> Result<Option<Self>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.acquired_at).num_minutes() >= LOCK_STALE_AFTER_MINUTES
    }

    /// `bootflow create-lbs (pid 4242 on build-host)`
    fn describe(&self) -> String {
        let command = if self.command.is_empty() {
            "bootflow"
        } else {
            self.command.as_str()
        };
        format!("{command} (pid {} on {})", self.pid, self.host)
    }
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Remove the lock file. A lock file someone else already removed
    /// counts as released.
    pub async fn release(mut self) -> Result<(), StoreError> {
        self.released = true;
        match fs::remove_file(&self.lock_path).await {
            Ok(()) => {
                tracing::debug!("state lock released");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for StateLock {
    // Covers early returns and panics between acquire and release.
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
