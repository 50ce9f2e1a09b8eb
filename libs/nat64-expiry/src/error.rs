#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Bib(#[from] nat64_bib::error::Error),

    #[error(transparent)]
    Session(#[from] nat64_session::error::Error),

    #[error(transparent)]
    Pool4(#[from] pool4::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
