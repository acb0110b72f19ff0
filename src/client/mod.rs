use std::time::Duration;
use async_trait::async_trait;
use crate::core::error::BridgeError;

mod context;
mod kafka;

pub use context::TracingContext;
pub use kafka::{producer_properties, KafkaSink, KafkaSource};

/// A record read from a topic, detached from the client's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedRecord {
    pub partition: i32,
    pub offset: i64,
    /// `None` for tombstones.
    pub payload: Option<Vec<u8>>,
}

/// Where the producer loop publishes keyed records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Resolves once the broker acknowledged the record or gave up on it.
    async fn send(&self, topic: &str, key: String, payload: Vec<u8>) -> Result<(), BridgeError>;

    async fn flush(&self, timeout: Duration) -> Result<(), BridgeError>;
}

/// Where the consumer loop reads records from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn subscribe(&self, topic: &str) -> Result<(), BridgeError>;

    /// `Ok(None)` when nothing arrived within `timeout`.
    async fn poll(&self, timeout: Duration) -> Result<Option<ConsumedRecord>, BridgeError>;
}
