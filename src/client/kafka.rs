use std::time::Duration;
use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tracing::{debug, info};
use crate::client::{ConsumedRecord, RecordSink, RecordSource, TracingContext};
use crate::config::ClientProperties;
use crate::core::error::BridgeError;

/// How long a record may wait for room in the local producer queue.
const QUEUE_TIMEOUT: Duration = Duration::from_secs(30);

/// librdkafka spells `acks` both ways.
const ACKS_KEYS: [&str; 2] = ["acks", "request.required.acks"];

/// Acknowledged by all in-sync replicas and idempotent, unless the
/// properties say otherwise. Idempotence requires `acks=all`, so it is only
/// defaulted when acks are left at, or set to, all.
pub fn producer_properties(properties: &ClientProperties) -> ClientProperties {
    let mut properties = properties.clone();
    let acks = ACKS_KEYS.iter().find_map(|key| properties.get(key));

    match acks {
        None => {
            properties
                .set("acks", "all")
                .set_default("enable.idempotence", "true");
        }
        Some("all") | Some("-1") => {
            properties.set_default("enable.idempotence", "true");
        }
        Some(_) => {}
    }
    properties
}

pub struct KafkaSink {
    producer: FutureProducer<TracingContext>,
}

impl KafkaSink {
    pub fn create(properties: &ClientProperties) -> Result<Self, BridgeError> {
        let producer: FutureProducer<TracingContext> = producer_properties(properties)
            .to_client_config()
            .create_with_context(TracingContext)?;
        info!("Kafka producer created");

        Ok(Self { producer })
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn send(&self, topic: &str, key: String, payload: Vec<u8>) -> Result<(), BridgeError> {
        let record = FutureRecord::to(topic).key(&key).payload(&payload);

        let delivery = self.producer.send(record, Timeout::After(QUEUE_TIMEOUT)).await;
        match delivery {
            Ok(_) => {
                debug!("delivered key={} to topic={}", key, topic);
                Ok(())
            }
            Err((err, _)) => Err(BridgeError::Delivery {
                topic: topic.to_string(),
                key,
                reason: err.to_string(),
            }),
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), BridgeError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| BridgeError::Output(std::io::Error::other(e)))??;
        Ok(())
    }
}

pub struct KafkaSource {
    consumer: StreamConsumer<TracingContext>,
}

impl KafkaSource {
    /// `group_id` replaces whatever `group.id` the properties carry.
    pub fn create(properties: &ClientProperties, group_id: &str) -> Result<Self, BridgeError> {
        let mut properties = properties.clone();
        properties.set("group.id", group_id);

        let consumer: StreamConsumer<TracingContext> = properties
            .to_client_config()
            .create_with_context(TracingContext)?;
        info!("Kafka consumer created with group.id={}", group_id);

        Ok(Self { consumer })
    }
}

#[async_trait]
impl RecordSource for KafkaSource {
    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.consumer.subscribe(&[topic])?;
        info!("subscribed to topic={}", topic);
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<ConsumedRecord>, BridgeError> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(message)) => Ok(Some(ConsumedRecord {
                partition: message.partition(),
                offset: message.offset(),
                payload: message.payload().map(<[u8]>::to_vec),
            })),
        }
    }
}
