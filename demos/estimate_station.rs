//! demos/estimate_station.rs
//!
//! Estimates the 1961-1990 normals of one station from its neighbours and
//! prints the summary.
//!
//! To run this demo:
//! cargo run --example estimate_station -- DATA/df_temp.parquet 744920

use baseline_estimator::{BaselineEstimator, LogReporter, Outcome, Reporter, RunConfig, TemperatureUnit};
use std::error::Error;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let archive = args.next().map(PathBuf::from).unwrap_or_else(|| "DATA/df_temp.parquet".into());
    let station = args.next().unwrap_or_else(|| "744920".to_string());

    // 1. Load the archive once, in Fahrenheit
    let estimator = BaselineEstimator::from_archive(&archive, TemperatureUnit::Fahrenheit).await?;

    // 2. Look at the candidate donors first
    let donors = estimator
        .find_donors()
        .station(&station)
        .max_distance_km(312.0)
        .call()?;
    println!("{} candidate donors within 312 km of {}", donors.len(), station);

    // 3. Run the estimate with the canonical periods and thresholds
    let config = RunConfig::builder().archive(&archive).target_station(&station).build();
    match estimator.evaluate(&config)? {
        Outcome::Estimated(evaluation) => LogReporter.render(&evaluation, &config)?,
        Outcome::NoEstimate { .. } => println!("No estimate available for {}", station),
    }
    Ok(())
}
