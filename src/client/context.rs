use rdkafka::client::ClientContext;
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::consumer::ConsumerContext;
use rdkafka::error::KafkaError;
use tracing::{debug, error, info, warn};

/// Routes librdkafka's own log lines and global errors into `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingContext;

impl ClientContext for TracingContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, message: &str) {
        match level {
            RDKafkaLogLevel::Emerg
            | RDKafkaLogLevel::Alert
            | RDKafkaLogLevel::Critical
            | RDKafkaLogLevel::Error => error!("librdkafka ({}): {}", fac, message),
            RDKafkaLogLevel::Warning => warn!("librdkafka ({}): {}", fac, message),
            RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => {
                info!("librdkafka ({}): {}", fac, message)
            }
            RDKafkaLogLevel::Debug => debug!("librdkafka ({}): {}", fac, message),
        }
    }

    fn error(&self, error: KafkaError, reason: &str) {
        error!("Kafka client error: {}, reason: {}", error, reason);
    }
}

impl ConsumerContext for TracingContext {}
