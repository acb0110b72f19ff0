use std::collections::VecDeque;
use std::io::Read;
use serde_json::de::IoRead;
use serde_json::{Map, StreamDeserializer, Value};
use tracing::debug;
use crate::core::error::BridgeError;

pub type JsonObject = Map<String, Value>;

/// Objects from a stream of JSON text. Top-level arrays are flattened one
/// level and everything that is not an object is skipped. Iteration ends
/// after the first syntax error.
pub struct JsonObjects<R: Read> {
    values: StreamDeserializer<'static, IoRead<R>, Value>,
    pending: VecDeque<Value>,
    failed: bool,
}

impl<R: Read> JsonObjects<R> {
    pub fn new(input: R) -> Self {
        Self {
            values: serde_json::Deserializer::from_reader(input).into_iter::<Value>(),
            pending: VecDeque::new(),
            failed: false,
        }
    }
}

impl<R: Read> Iterator for JsonObjects<R> {
    type Item = Result<JsonObject, BridgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                match value {
                    Value::Object(object) => return Some(Ok(object)),
                    other => {
                        debug!("skipping non-object input value: {}", other);
                        continue;
                    }
                }
            }

            if self.failed {
                return None;
            }

            match self.values.next()? {
                Ok(Value::Array(items)) => self.pending.extend(items),
                Ok(value) => self.pending.push_back(value),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// The record key: the string value of `field`, if there is one.
pub fn record_key<'a>(object: &'a JsonObject, field: &str) -> Option<&'a str> {
    object.get(field).and_then(Value::as_str)
}
