//! Error kinds for the admin-facing interface (§6, §7). The packet path
//! never surfaces these; it only ever returns a `Verdict`
//! ([`crate::interface::Verdict`]).

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pool4(#[from] pool4::error::Error),

    #[error(transparent)]
    Bib(#[from] nat64_bib::error::Error),

    #[error(transparent)]
    Session(#[from] nat64_session::error::Error),

    #[error(transparent)]
    Expiry(#[from] nat64_expiry::error::Error),

    #[error("invalid configuration: {0}")]
    BadConfig(String),

    #[error("unsupported transport protocol")]
    ProtoUnsupported,
}

pub type Result<T> = std::result::Result<T, Error>;
