use std::io::Read;
use std::time::Duration;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::{error, info, warn};
use crate::client::{KafkaSink, RecordSink};
use crate::config::ClientProperties;
use crate::core::error::BridgeError;
use crate::core::record::{record_key, JsonObject, JsonObjects};

const FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads JSON objects from `input` and publishes each one on `topic`, keyed
/// by the string in `key_field`.
///
/// `input` may hold a JSON object, an array of objects, or a sequence of
/// either. Returns `true` only if every record was delivered.
pub async fn produce<R, F>(
    properties: &ClientProperties,
    topic: &str,
    input: R,
    key_field: &str,
    filter: F,
) -> bool
where
    R: Read,
    F: Fn(&JsonObject) -> bool,
{
    let sink = match KafkaSink::create(properties) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Cannot create producer: {}", e);
            return false;
        }
    };

    produce_to(&sink, topic, input, key_field, filter).await
}

pub async fn produce_to<S, R, F>(
    sink: &S,
    topic: &str,
    input: R,
    key_field: &str,
    filter: F,
) -> bool
where
    S: RecordSink,
    R: Read,
    F: Fn(&JsonObject) -> bool,
{
    let mut input_ok = true;
    let mut pending = FuturesUnordered::new();
    let mut total = 0;
    let mut failed = 0;

    for item in JsonObjects::new(input) {
        let object = match item {
            Ok(object) => object,
            Err(e) => {
                error!("{}", e);
                input_ok = false;
                break;
            }
        };

        if !filter(&object) {
            continue;
        }

        let Some(key) = record_key(&object, key_field) else {
            warn!("skipping object without string field {:?}", key_field);
            continue;
        };
        let key = key.to_string();

        match serde_json::to_vec(&object) {
            Ok(payload) => {
                pending.push(sink.send(topic, key, payload));
                total += 1;
            }
            Err(e) => {
                error!("Cannot serialize record with key {}: {}", key, e);
                input_ok = false;
            }
        }

        // Polling hands new records to the sink before the next read blocks.
        while let Some(Some(result)) = pending.next().now_or_never() {
            failed += delivery_failed(result);
        }
    }

    while let Some(result) = pending.next().await {
        failed += delivery_failed(result);
    }

    let flushed = match sink.flush(FLUSH_TIMEOUT).await {
        Ok(()) => true,
        Err(e) => {
            error!("Producer flush failed: {}", e);
            false
        }
    };

    info!(
        "produced {} of {} records to topic={}",
        total - failed,
        total,
        topic
    );

    input_ok && flushed && failed == 0
}

fn delivery_failed(result: Result<(), BridgeError>) -> usize {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}
