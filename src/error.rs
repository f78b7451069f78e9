use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request to {url} failed after {attempts} attempts: {source}")]
    Fetch {
        url: String,
        attempts: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),
    #[error("Couldn't extract a facility: {0}")]
    Extraction(String),

    #[error("No facilities found, nothing to export.")]
    EmptyResult,

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    pub fn extraction(reason: impl Into<String>) -> Self {
        Error::Extraction(reason.into())
    }
}
