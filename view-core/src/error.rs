use thiserror::Error;

/// Failure of a view operation against the page or one of its storage surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The target node is not rendered on this page. Callers treat this as a
    /// silent no-op; it is reported so tests can tell absence from a bug.
    #[error("element not found: {id}")]
    MissingElement { id: String },
    #[error("unrecognised control: {0}")]
    UnknownControl(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("history error: {0}")]
    History(String),
}

impl ViewError {
    pub fn missing(id: impl Into<String>) -> Self {
        ViewError::MissingElement { id: id.into() }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ViewError::MissingElement { .. })
    }
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Failure of the asynchronous server-list lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Collapse a batch of already-applied DOM updates into the first failure.
///
/// Every update in the batch has run by the time this is called, so a missing
/// node never prevents the remaining ones from being applied.
pub(crate) fn settle(results: impl IntoIterator<Item = ViewResult<()>>) -> ViewResult<()> {
    let mut outcome = Ok(());
    for result in results {
        if outcome.is_ok() {
            outcome = result;
        }
    }
    outcome
}

/// Treat a missing element as success; keep every other failure.
pub fn ignore_missing(result: ViewResult<()>) -> ViewResult<()> {
    match result {
        Err(err) if err.is_missing() => Ok(()),
        other => other,
    }
}
