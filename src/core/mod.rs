pub mod consumer;
pub mod error;
pub mod producer;
pub mod record;
