use crate::args::{read_token, Args};
use crate::quay::QuayClient;
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};

mod args;
mod quay;
mod report;
mod tag;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::new();
    configure_tracing(args.debug, args.trace);

    let token = read_token()?;
    let config = args.config();
    if !config.purge {
        warn!("Dry run. No tags will be deleted, pass --purge to delete them");
    }

    let start = Instant::now();

    let client = QuayClient::new(&args.registry, token);
    let summary = report::run(&config, &client, &mut std::io::stdout().lock()).await?;

    let delta = Instant::now() - start;
    info!("Done. {} expired tags. Took {}", summary.expired, fmt_elapsed(delta));
    Ok(())
}

fn fmt_elapsed(duration: Duration) -> String {
    if duration.as_secs() > 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn configure_tracing(debug: bool, trace: bool) {
    let level = if trace {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Setting tracing subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_elapsed_time() {
        assert_eq!(fmt_elapsed(Duration::from_millis(2500)), "2s");
        assert_eq!(fmt_elapsed(Duration::from_millis(340)), "340ms");
    }
}
