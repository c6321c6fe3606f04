use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Duplicate interface in database: {0}")]
    DuplicateInterface(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
