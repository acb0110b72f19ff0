use std::io::Write;
use std::time::Duration;
use serde_json::Value;
use tokio::sync::watch::Receiver;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use crate::client::{ConsumedRecord, KafkaSource, RecordSource};
use crate::config::ClientProperties;
use crate::core::error::BridgeError;

pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Consumes JSON records from `topic` and writes each value to `out` as one
/// line, until `shutdown` fires.
///
/// Every call joins a fresh consumer group, so no offsets are shared between
/// runs. Returns `false` if the consumer could not be set up or `out` became
/// unwritable.
pub async fn consume<W, F>(
    properties: &ClientProperties,
    topic: &str,
    out: &mut W,
    filter: F,
    shutdown: Receiver<()>,
) -> bool
where
    W: Write,
    F: Fn(&Value) -> bool,
{
    let group_id = Uuid::new_v4().to_string();
    let source = match KafkaSource::create(properties, &group_id) {
        Ok(source) => source,
        Err(e) => {
            error!("Cannot create consumer: {}", e);
            return false;
        }
    };

    consume_from(&source, topic, out, filter, shutdown).await
}

pub async fn consume_from<S, W, F>(
    source: &S,
    topic: &str,
    out: &mut W,
    filter: F,
    mut shutdown: Receiver<()>,
) -> bool
where
    S: RecordSource,
    W: Write,
    F: Fn(&Value) -> bool,
{
    if let Err(e) = source.subscribe(topic) {
        error!("Cannot subscribe to topic {}: {}", topic, e);
        return false;
    }

    let mut printed: u64 = 0;
    loop {
        let polled = tokio::select! {
            biased;

            _ = shutdown.changed() => {
                info!("Shutdown signal received, printed {} records", printed);
                return true;
            }

            polled = source.poll(POLL_TIMEOUT) => polled,
        };

        let record = match polled {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                error!("Poll failed: {}", e);
                continue;
            }
        };

        let Some(value) = decode(&record) else {
            continue;
        };
        if !filter(&value) {
            continue;
        }

        if let Err(e) = print(&value, out) {
            error!("{}", e);
            return false;
        }
        printed += 1;
    }
}

fn decode(record: &ConsumedRecord) -> Option<Value> {
    let Some(payload) = record.payload.as_deref().filter(|p| !p.is_empty()) else {
        debug!(
            "skipping tombstone at partition={} offset={}",
            record.partition, record.offset
        );
        return None;
    };

    match serde_json::from_slice::<Value>(payload) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(other) => {
            warn!(
                "skipping non-object record at partition={} offset={}: {}",
                record.partition, record.offset, other
            );
            None
        }
        Err(e) => {
            warn!(
                "skipping non-JSON record at partition={} offset={}: {}",
                record.partition, record.offset, e
            );
            None
        }
    }
}

fn print<W: Write>(value: &Value, out: &mut W) -> Result<(), BridgeError> {
    let mut line = serde_json::to_vec(value).map_err(|e| BridgeError::Output(e.into()))?;
    line.push(b'\n');
    out.write_all(&line)?;
    out.flush()?;
    Ok(())
}
