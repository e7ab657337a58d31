pub mod config;
pub mod error;
pub mod hash;
pub mod ring;
pub mod telemetry;
pub mod utils;

pub use ring::{accept_any, accept_unique, RingEntry, RingHash, StringNode};

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
