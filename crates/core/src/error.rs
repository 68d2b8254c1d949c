use thiserror::Error;

/// Failure of one outbound call to a hosted API
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0} credential is not configured")]
    MissingCredential(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Response contained no usable content")]
    EmptyResponse,
}
