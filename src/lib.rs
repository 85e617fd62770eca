pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod store;
pub mod tasks;
pub mod transform;
pub mod types;
