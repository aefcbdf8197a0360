use thiserror::Error;

/// Errors returned by the key-value store client.
#[derive(Debug, Error)]
pub enum KvError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned an error entry for a pipelined command.
    #[error("kv command error: {0}")]
    Api(String),

    /// The response body did not match the expected pipeline shape.
    #[error("unexpected kv response shape: {0}")]
    Shape(String),

    /// No store is configured for this deployment.
    #[error("kv store not configured")]
    Unconfigured,
}
