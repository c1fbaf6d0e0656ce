pub mod comment;
pub mod config;

#[cfg(test)]
mod config_test;

pub use comment::*;
pub use config::*;
