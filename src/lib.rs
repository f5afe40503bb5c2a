pub mod ai;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod processing;
pub mod server;
pub mod stats;
#[cfg(test)]
pub mod test_helpers;
