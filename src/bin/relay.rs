use bucketlist::config::RelayConfig;
use bucketlist::server::{self, state::State};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig::from_env()?;
    bucketlist::logging::init("bucketlist-relay", config.debug_logging);

    log::info!(
        "Relay for {} on branch {}",
        config.csv_path,
        config.branch
    );

    let state = State::new(&config);
    server::serve(state).await?;

    Ok(())
}
