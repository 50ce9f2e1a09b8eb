#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a session already exists for this flow")]
    AlreadyExists,

    #[error("no such session")]
    NotFound,

    #[error(transparent)]
    Bib(#[from] nat64_bib::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
