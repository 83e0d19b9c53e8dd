use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from oracle: {0}")]
    InvalidResponse(String),

    #[error("oracle api key is missing")]
    MissingApiKey,
}
