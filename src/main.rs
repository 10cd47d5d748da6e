use std::time::Duration;

use clap::Parser;

use solr_check::{
    check::SOURCE_TYPE_NAME, sink::logging::LogSink, CheckOutcome, HttpFetcher, InstanceConfig,
    SolrCheck,
};

#[derive(Debug, Parser)]
struct Cli {
    /// Host running Solr
    #[arg(short = 'H', long, env = "SolrHost", default_value = "localhost")]
    host: String,

    /// Ports on which Solr may listen, tried in order
    #[arg(
        short = 'P',
        long,
        env = "SolrPorts",
        value_delimiter = ',',
        default_value = "8983"
    )]
    ports: Vec<u16>,

    /// Period in seconds at which the check runs
    #[arg(short, long, env = "Period", default_value_t = 10.0, value_parser = parse_period)]
    period: f64,
}

/// Parse a period in seconds, which must be finite and positive
fn parse_period(value: &str) -> Result<f64, String> {
    let period = value
        .parse::<f64>()
        .map_err(|err| format!("invalid period {value:?}: {err}"))?;

    if period.is_finite() && period > 0.0 && Duration::try_from_secs_f64(period).is_ok() {
        Ok(period)
    } else {
        Err(format!("period must be a positive number of seconds, got {value}"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();
    let cli = Cli::parse();

    let instance = InstanceConfig::new(cli.host, cli.ports);
    let mut check = SolrCheck::new(SOURCE_TYPE_NAME, HttpFetcher::new());
    let mut sink = LogSink::new(SOURCE_TYPE_NAME);

    log::info!(
        "Monitor Solr on {}:{:?} every {}s",
        instance.host,
        instance.ports,
        cli.period
    );

    let mut interval = tokio::time::interval(Duration::from_secs_f64(cli.period));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        // A failed cycle is reported and the next one runs normally
        match check.check(&instance, &mut sink).await {
            Ok(CheckOutcome::Submitted { gauges }) => {
                log::debug!("{gauges} gauges submitted, {} in total", sink.submitted())
            }
            Ok(CheckOutcome::Unsupported { .. }) => {}
            Ok(CheckOutcome::VersionUnknown) => {
                log::info!("Solr version is not known yet, waiting for Solr to answer")
            }
            Err(err) => log::error!("Solr check failed: {err}"),
        }
    }
}
