pub mod config;
pub mod core;
pub mod handler;
pub mod providers;
pub mod server;
pub mod srt;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{HandlerConfig, ServerConfig};
pub use core::types::*;
pub use handler::TranslationHandler;
