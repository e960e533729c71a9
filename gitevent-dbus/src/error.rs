use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("D-Bus error: {0}")]
    Bus(#[from] zbus::Error),

    #[error("Malformed change in signal body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No signal schema for {0}")]
    UnknownSignal(String),
}

impl From<BridgeError> for gitevent_core::Error {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Decode(e) => gitevent_core::Error::Serialization(e),
            other => gitevent_core::Error::Sink(other.to_string()),
        }
    }
}
