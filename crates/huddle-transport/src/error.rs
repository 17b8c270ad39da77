/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Starting the host side failed (bind, listen).
    #[error("host start failed: {0}")]
    HostStartFailed(#[source] std::io::Error),

    /// Starting the client side failed before a dial was even attempted.
    #[error("client start failed: {0}")]
    ClientStartFailed(String),

    /// A host or client is already running; shut it down first.
    #[error("transport already running")]
    AlreadyRunning,

    /// Closing connections during shutdown failed.
    #[error("shutdown failed: {0}")]
    ShutdownFailed(String),
}
