use thiserror::Error;

/// Error types for node discovery, refresh and persistence
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network Interface Error: {0}")]
    NetworkInterfaceWrapped(#[from] network_interface::Error),

    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("No base IP address saved; save one before scanning")]
    NoSavedAddress,

    #[error("Persistence Error: {0}")]
    Persistence(String),

    #[error("Difficulty Format Error: {0:?}")]
    DifficultyFormat(String),

    #[error("Error: {0}")]
    Other(String),
}
