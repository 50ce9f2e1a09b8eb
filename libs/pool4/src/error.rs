//! Error types for this library

use std::net::Ipv4Addr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Address {0} is not registered in the pool")]
    NotFound(Ipv4Addr),
    #[error("Address {0} was only found in {1} of 3 protocol tables (inconsistent state)")]
    Inconsistent(Ipv4Addr, usize),
}

pub type Result<T> = std::result::Result<T, Error>;
