pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

pub const STATE_DIR_ENV: &str = "BOOTFLOW_STATE_DIR";
pub const TERRAFORM_DIR_ENV: &str = "BOOTFLOW_TERRAFORM_DIR";
pub const TERRAFORM_BIN_ENV: &str = "BOOTFLOW_TERRAFORM_BIN";
pub const BOSH_BIN_ENV: &str = "BOOTFLOW_BOSH_BIN";

/// Locate the state directory
///
/// Resolution order:
/// 1. `explicit` (the `--state-dir` flag)
/// 2. the `BOOTFLOW_STATE_DIR` environment variable
/// 3. the current directory
///
/// A leading `~` is expanded. The directory does not have to exist yet, but
/// if something exists at that path it must be a directory.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let candidate = match explicit {
        Some(path) => expand_home(path)?,
        None => match std::env::var_os(STATE_DIR_ENV) {
            Some(value) if !value.is_empty() => expand_home(Path::new(&value))?,
            _ => std::env::current_dir()?,
        },
    };

    if candidate.exists() && !candidate.is_dir() {
        return Err(ConfigError::NotADirectory(candidate));
    }

    Ok(candidate)
}

/// Replace a leading `~` with the user's home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Binary used to drive terraform
pub fn terraform_binary() -> String {
    binary_from_env(TERRAFORM_BIN_ENV, "terraform")
}

/// Binary used to talk to the director
pub fn bosh_binary() -> String {
    binary_from_env(BOSH_BIN_ENV, "bosh")
}

fn binary_from_env(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Working locations under a state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    state_dir: PathBuf,
}

impl Paths {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn cloud_config_dir(&self) -> PathBuf {
        self.state_dir.join("cloud-config")
    }

    pub fn terraform_dir(&self) -> PathBuf {
        self.state_dir.join("terraform")
    }

    /// Default location of the terraform templates
    pub fn terraform_templates_dir(&self) -> PathBuf {
        self.terraform_dir().join("templates")
    }

    /// Directory terraform runs in
    pub fn terraform_work_dir(&self) -> PathBuf {
        self.terraform_dir().join("work")
    }
}
