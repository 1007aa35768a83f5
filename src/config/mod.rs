pub mod loader;
pub mod schema;

pub use schema::{Config, ReliabilityConfig, TelegramConfig};
