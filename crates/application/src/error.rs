use focusguard_bridge::BridgeError;
use focusguard_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("protection store is not ready")]
    NotReady,
    #[error("protection store has stopped")]
    Closed,
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),
    #[error("event log error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
