use thiserror::Error;

/// Errors talking to the source of truth
#[derive(Debug, Error)]
pub enum ApiError {
    /// Could not reach the server or the request timed out
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL response carried an `errors` array
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// Response body was not the JSON we expected
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Client settings cannot be turned into a request
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Operation needs a token and none is configured
    #[error("No API token configured (set {0})")]
    MissingToken(&'static str),
}
