#![doc = include_str!("../README.md")]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
mod queue;
mod queues;
mod reaper;
mod timeouts;

pub use queue::ExpiryQueue;
pub use queues::{all_classes, ExpiryQueues};
pub use reaper::{ReapStats, Reaper};
pub use timeouts::Timeouts;
