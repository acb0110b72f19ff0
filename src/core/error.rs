use std::io;
use std::path::PathBuf;
use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Cannot read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config at line {line}: {reason}")]
    ConfigSyntax { line: usize, reason: String },

    #[error("Invalid JSON input: {0}")]
    Input(#[from] serde_json::Error),

    #[error("Kafka client error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Delivery to topic {topic} with key {key} failed: {reason}")]
    Delivery {
        topic: String,
        key: String,
        reason: String,
    },

    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}
