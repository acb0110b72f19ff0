use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use rdkafka::ClientConfig;
use tracing::debug;
use crate::core::error::BridgeError;

/// Settings of the Java client that name serializer classes. librdkafka
/// rejects unknown keys, so these never reach the client.
const JAVA_ONLY_KEYS: [&str; 4] = [
    "key.serializer",
    "value.serializer",
    "key.deserializer",
    "value.deserializer",
];

/// Kafka client settings read from a Java-style `.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientProperties {
    entries: BTreeMap<String, String>,
}

impl ClientProperties {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BridgeError> {
        let raw = fs::read_to_string(&path).map_err(|source| BridgeError::ConfigRead {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parses properties text. Later duplicates of a key win.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let mut entries = BTreeMap::new();

        for (line_no, line) in logical_lines(raw) {
            let (key, value) = split_key_value(&line);
            let key = unescape(key, line_no)?;
            let value = unescape(value, line_no)?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Sets `key` only when the file did not.
    pub fn set_default(&mut self, key: &str, value: &str) -> &mut Self {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (key, value) in self.iter() {
            if JAVA_ONLY_KEYS.contains(&key) {
                debug!("ignoring Java client setting {}={}", key, value);
                continue;
            }
            config.set(key, value);
        }
        config
    }
}

/// Joins continued physical lines and drops blanks and comments. Each
/// logical line comes with the 1-based number of its first physical line.
fn logical_lines(raw: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut lines = raw.lines().enumerate();

    while let Some((idx, physical)) = lines.next() {
        let trimmed = physical.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        out.push((idx + 1, logical));
    }

    out
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn is_separator(c: char) -> bool {
    c == '=' || c == ':'
}

/// Splits on the first unescaped `=`, `:` or whitespace. Both halves are
/// still escaped.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut chars = line.char_indices();
    let mut key_end = line.len();

    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if is_separator(c) || c.is_whitespace() {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(c) = rest.chars().next() {
        if is_separator(c) {
            rest = rest[c.len_utf8()..].trim_start();
        }
    }
    (key, rest)
}

fn unescape(s: &str, line: usize) -> Result<String, BridgeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let malformed = |hex: &str| BridgeError::ConfigSyntax {
                    line,
                    reason: format!("malformed \\u escape \"\\u{}\"", hex),
                };
                let hex: String = chars.by_ref().take(4).collect();
                let unit = hex_unit(&hex).ok_or_else(|| malformed(&hex))?;

                let code = if (0xD800..0xDC00).contains(&unit) {
                    // A high surrogate must be followed by an escaped low one.
                    let mut ahead = chars.clone();
                    let low = match (ahead.next(), ahead.next()) {
                        (Some('\\'), Some('u')) => {
                            let low_hex: String = ahead.by_ref().take(4).collect();
                            hex_unit(&low_hex).filter(|low| (0xDC00..0xE000).contains(low))
                        }
                        _ => None,
                    }
                    .ok_or_else(|| malformed(&hex))?;
                    chars = ahead;
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };

                out.push(char::from_u32(code).ok_or_else(|| malformed(&hex))?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn hex_unit(hex: &str) -> Option<u32> {
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
