use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "prodcon",
    version,
    about = "Console consumer and producer for JSON records on a Kafka topic",
    long_about = "Consume mode prints the records of a topic to stdout, one JSON document per line. \
                  Produce mode reads a JSON object, an array of JSON objects, or a sequence of \
                  those from stdin and publishes every object on the topic."
)]
pub struct Params {
    #[arg(value_enum)]
    pub mode: Mode,

    /// Kafka client settings in Java properties format.
    #[arg(short = 'c', long = "config-file", env = "PRODCON_CONFIG_FILE")]
    pub config_file: PathBuf,

    #[arg(short = 't', long, env = "PRODCON_TOPIC")]
    pub topic: String,

    /// Field whose string value becomes the record key when producing.
    #[arg(long, env = "PRODCON_KEY_FIELD", default_value = "_id")]
    pub key_field: String,

    /// Default log filter. RUST_LOG takes precedence.
    #[arg(long, env = "PRODCON_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Print the records of the topic to stdout.
    Consume,
    /// Publish the JSON objects read from stdin.
    Produce,
}

/// What to print, and how to exit, when the arguments don't yield `Params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub message: String,
    pub exit_code: u8,
    pub to_stderr: bool,
}

impl Params {
    /// Help and version requests exit with 0 on stdout. Anything else that
    /// fails to parse is a usage error exiting with 1 on stderr.
    pub fn parse_or_usage<I, T>(args: I) -> Result<Self, Usage>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| {
            let to_stderr = e.use_stderr();
            Usage {
                message: e.render().to_string(),
                exit_code: if to_stderr { 1 } else { 0 },
                to_stderr,
            }
        })
    }
}

impl Usage {
    /// Writes the message to the stream clap chose and returns the exit code.
    pub fn report<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> u8 {
        let target: &mut dyn Write = if self.to_stderr { err } else { out };
        let _ = target.write_all(self.message.as_bytes());
        let _ = target.flush();
        self.exit_code
    }
}
