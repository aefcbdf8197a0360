use thiserror::Error;

/// Request-level failures the engine itself can raise. Everything else —
/// lane failures, detail failures, cache trouble — is absorbed as "fewer
/// candidates" and never reaches the caller as an error. Missing
/// configuration is a startup concern (see `sortie_core::ConfigError`) or a
/// rate-limit store concern (`sortie_kv::KvError::Unconfigured`).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request body is malformed beyond what fallback defaults absorb.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
