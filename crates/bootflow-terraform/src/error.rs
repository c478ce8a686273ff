//! Terraform adapter error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("terraform binary not found: {0}")]
    BinaryNotFound(String),

    #[error("terraform {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("terraform templates not found in {0}")]
    TemplatesNotFound(PathBuf),

    #[error("failed to read terraform state {path}: {source}")]
    StateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerraformError>;
