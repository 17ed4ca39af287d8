pub mod config;
pub mod contract;
pub mod error;
pub mod network;
pub mod view;
pub mod wallet;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{MintError, MintResult};
