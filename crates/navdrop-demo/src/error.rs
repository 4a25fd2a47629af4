use navdrop::{ConfigError, DropdownError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to assemble dropdown: {0}")]
    Dropdown(#[from] DropdownError),
    #[error("failed to encode transcript: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid argument: {0}")]
    Usage(String),
}

impl DemoError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Config(_) => 3,
            Self::Dropdown(_) => 4,
            Self::Json(_) | Self::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
