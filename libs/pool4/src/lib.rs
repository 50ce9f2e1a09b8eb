#![doc = include_str!("../README.md")]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
mod node;
mod section;
mod table;
mod types;

pub use table::Pool4;
pub use types::{Ipv4TransportAddr, PortRange, Protocol};
