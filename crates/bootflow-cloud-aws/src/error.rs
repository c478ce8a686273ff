//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AwsError {
    #[error("aws access key id must be provided")]
    MissingAccessKeyId,

    #[error("aws secret access key must be provided")]
    MissingSecretAccessKey,

    #[error("aws region must be provided")]
    MissingRegion,
}

pub type Result<T> = std::result::Result<T, AwsError>;
