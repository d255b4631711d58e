//! Integration logging
//!
//! Side channel recording every external lookup:
//! - IntegrationLogger: non-blocking handle feeding a background consumer
//! - IntegrationLogStore: where the consumer persists entries

pub mod logger;
pub mod store;

pub use logger::{IntegrationLogger, LoggerConfig, LoggerMetrics, LoggerStats};
pub use store::{InMemoryLogStore, IntegrationLogStore};
