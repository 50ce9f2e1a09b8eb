use crate::types::{BibId, Ipv6TransportAddr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("BIB entry for {0} already exists")]
    AlreadyExists(Ipv6TransportAddr),

    #[error("no BIB entry {0:?}")]
    NotFoundById(BibId),

    #[error(transparent)]
    Pool4(#[from] pool4::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
