#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use prodcon::client::{ConsumedRecord, RecordSink, RecordSource};
use prodcon::BridgeError;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use tokio::sync::watch::Sender;

pub fn config_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("prodcon_test_")
        .tempdir()
        .expect("failed to create temp dir");
    let path = dir.path().join("client.properties");
    std::fs::write(&path, contents).expect("failed to write config file");
    (dir, path)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub topic: String,
    pub key: String,
    pub value: serde_json::Value,
}

/// Records every send; keys listed in `fail_keys` are rejected.
#[derive(Default)]
pub struct MemorySink {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_keys: HashSet<String>,
    pub fail_flush: bool,
    pub flushed: Mutex<bool>,
}

impl MemorySink {
    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.key).collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn send(&self, topic: &str, key: String, payload: Vec<u8>) -> Result<(), BridgeError> {
        if self.fail_keys.contains(&key) {
            return Err(BridgeError::Delivery {
                topic: topic.to_string(),
                key,
                reason: "Message timed out".to_string(),
            });
        }
        let value = serde_json::from_slice(&payload).expect("payload is not JSON");
        self.sent.lock().unwrap().push(Sent {
            topic: topic.to_string(),
            key,
            value,
        });
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), BridgeError> {
        *self.flushed.lock().unwrap() = true;
        if self.fail_flush {
            return Err(BridgeError::Kafka(KafkaError::Flush(RDKafkaErrorCode::OperationTimedOut)));
        }
        Ok(())
    }
}

/// Replays scripted poll results, then signals shutdown.
pub struct ScriptedSource {
    polls: Mutex<VecDeque<Result<Option<ConsumedRecord>, BridgeError>>>,
    shutdown: Sender<()>,
    pub subscribed: Mutex<Vec<String>>,
    pub fail_subscribe: bool,
}

impl ScriptedSource {
    pub fn new(shutdown: Sender<()>) -> Self {
        Self {
            polls: Mutex::new(VecDeque::new()),
            shutdown,
            subscribed: Mutex::new(Vec::new()),
            fail_subscribe: false,
        }
    }

    pub fn record(self, offset: i64, payload: Option<&[u8]>) -> Self {
        self.polls.lock().unwrap().push_back(Ok(Some(ConsumedRecord {
            partition: 0,
            offset,
            payload: payload.map(<[u8]>::to_vec),
        })));
        self
    }

    pub fn json(self, offset: i64, value: serde_json::Value) -> Self {
        let payload = serde_json::to_vec(&value).unwrap();
        self.record(offset, Some(&payload))
    }

    pub fn idle(self) -> Self {
        self.polls.lock().unwrap().push_back(Ok(None));
        self
    }

    pub fn error(self) -> Self {
        self.polls.lock().unwrap().push_back(Err(BridgeError::Kafka(
            KafkaError::MessageConsumption(RDKafkaErrorCode::BrokerTransportFailure),
        )));
        self
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        if self.fail_subscribe {
            return Err(BridgeError::Kafka(KafkaError::Subscription(topic.to_string())));
        }
        self.subscribed.lock().unwrap().push(topic.to_string());
        Ok(())
    }

    async fn poll(&self, _timeout: Duration) -> Result<Option<ConsumedRecord>, BridgeError> {
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(polled) => polled,
            None => {
                let _ = self.shutdown.send(());
                Ok(None)
            }
        }
    }
}

/// A writer whose every write fails, like stdout piped into a closed reader.
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Serves one line at a time and notes how many records the sink had taken
/// each time it starts a new line, like a slow pipe feeding stdin.
pub struct LineFeed<'a> {
    lines: Vec<Vec<u8>>,
    line: usize,
    pos: usize,
    sink: &'a MemorySink,
    pub sent_at_line_start: Vec<usize>,
}

impl<'a> LineFeed<'a> {
    pub fn new(lines: Vec<String>, sink: &'a MemorySink) -> Self {
        Self {
            lines: lines.into_iter().map(|l| format!("{l}\n").into_bytes()).collect(),
            line: 0,
            pos: 0,
            sink,
            sent_at_line_start: Vec::new(),
        }
    }
}

impl std::io::Read for LineFeed<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some(current) = self.lines.get(self.line) else {
            return Ok(0);
        };
        if self.pos == 0 {
            self.sent_at_line_start.push(self.sink.sent.lock().unwrap().len());
        }
        let n = (current.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&current[self.pos..self.pos + n]);
        self.pos += n;
        if self.pos == current.len() {
            self.line += 1;
            self.pos = 0;
        }
        Ok(n)
    }
}
