use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoogleApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry read failed: {0}")]
    Read(#[source] GoogleApiError),

    #[error("Registry write failed: {0}")]
    Write(#[source] GoogleApiError),

    #[error("Invalid registry input: {0}")]
    Invalid(String),
}
