use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Not an HTML document ({content_type}): {url}")]
    NotHtml { url: String, content_type: String },

    #[error("Redirect from {url} leaves the seed hosts: {location}")]
    OffsiteRedirect { url: String, location: String },

    #[error("Response body of {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Record sink closed before the crawl finished")]
    SinkClosed,

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// Fetch-level failures are skipped by the driver; everything else ends the run.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ScanError::HttpError(_)
                | ScanError::Status { .. }
                | ScanError::NotHtml { .. }
                | ScanError::OffsiteRedirect { .. }
                | ScanError::BodyTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
