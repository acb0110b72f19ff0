use std::io;
use std::process::ExitCode;
use anyhow::{Context, Result};
use prodcon::cli::{self, Mode, Params};
use prodcon::{runtime, ClientProperties};
use tracing::{error, info};

// prodcon produce -c client.properties -t events < records.json
// prodcon consume -c client.properties -t events

#[tokio::main]
async fn main() -> ExitCode {
    let params = match Params::parse_or_usage(std::env::args_os()) {
        Ok(params) => params,
        Err(usage) => {
            let code = usage.report(&mut io::stdout(), &mut io::stderr());
            return ExitCode::from(code);
        }
    };

    cli::init_tracing(&params.log_level);

    ExitCode::from(exit_code(run(params).await))
}

fn exit_code(outcome: Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

async fn run(params: Params) -> Result<bool> {
    let properties = ClientProperties::load(&params.config_file)
        .with_context(|| format!("loading client configuration {:?}", params.config_file))?;
    info!(
        "prodcon {:?} on topic={} with {} client settings",
        params.mode,
        params.topic,
        properties.len()
    );

    let ok = match params.mode {
        Mode::Consume => {
            let shutdown = runtime::shutdown_on_interrupt();
            let mut out = io::stdout().lock();
            prodcon::consume(&properties, &params.topic, &mut out, |_| true, shutdown).await
        }
        Mode::Produce => {
            let input = io::stdin().lock();
            prodcon::produce(&properties, &params.topic, input, &params.key_field, |_| true).await
        }
    };

    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn outcome_maps_to_exit_code() {
        assert_eq!(exit_code(Ok(true)), 0);
        assert_eq!(exit_code(Ok(false)), 1);
        assert_eq!(exit_code(Err(anyhow::anyhow!("no config"))), 1);
    }

    #[tokio::test]
    async fn missing_config_file_is_a_setup_error() {
        let params = Params::parse_or_usage([
            "prodcon",
            "produce",
            "-c",
            "/nonexistent/prodcon/client.properties",
            "-t",
            "events",
        ])
        .unwrap();
        assert_eq!(params.config_file, PathBuf::from("/nonexistent/prodcon/client.properties"));

        let err = run(params).await.unwrap_err();
        assert!(format!("{:#}", err).contains("loading client configuration"));
    }
}
