use std::process::ExitCode;

use carstatus::print_stats;
use carstatus_client::config::Config;
use carstatus_client::geocoding::NominatimGeocodingClient;
use carstatus_client::load_vehicle_data;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();
    carstatus::logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(mode = ?config.mode, "carstatus: configuration loaded");

    let snapshot = load_vehicle_data(&config).await?;
    let geocoder = NominatimGeocodingClient::from_config(&config)?;
    let today = chrono::Local::now().date_naive();

    let mut stdout = std::io::stdout().lock();
    print_stats(
        &mut stdout,
        &snapshot,
        &geocoder,
        config.allowance.as_ref(),
        today,
    )
    .await?;
    Ok(())
}
