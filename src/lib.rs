pub mod cli;
pub mod client;
pub mod core;
pub mod runtime;
mod config;

pub use config::ClientProperties;
pub use crate::core::consumer::consume;
pub use crate::core::error::BridgeError;
pub use crate::core::producer::produce;
