use thiserror::Error;

/// Failures at the edges of the crate. Parsing and selecting never fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    Args(#[from] pico_args::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("selector `{0}` can never match")]
    InvalidSelector(String),
}
