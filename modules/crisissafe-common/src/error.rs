use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrisisSafeError {
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Article fetch error: {0}")]
    Fetch(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
