use baseline_estimator::{
    BaselineError, BaselineEstimator, CsvReporter, LogReporter, Outcome, Period, ReportError, Reporter, RunConfig,
    TemperatureUnit,
};
use clap::Parser;
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "baseline-estimator")]
#[command(about = "Estimate a station's 1961-1990 style monthly normals from nearby donor stations", long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long, env = "BASELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Station-year archive (.parquet, .csv or .csv.gz)
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Target station id (e.g. "744920")
    #[arg(long)]
    station: Option<String>,

    /// Donor search radius in km
    #[arg(long)]
    radius_km: Option<f64>,

    /// Segment period start, YYYY-MM
    #[arg(long, requires = "segment_end")]
    segment_start: Option<String>,

    /// Segment period end, YYYY-MM
    #[arg(long, requires = "segment_start")]
    segment_end: Option<String>,

    /// Normal period start, YYYY-MM
    #[arg(long, requires = "normal_end")]
    normal_start: Option<String>,

    /// Normal period end, YYYY-MM
    #[arg(long, requires = "normal_start")]
    normal_end: Option<String>,

    /// Donors need more than this many normal-period years in every month
    #[arg(long)]
    min_baseline_years: Option<usize>,

    /// Donors need more than this many overlapping segment years in every month
    #[arg(long)]
    min_overlap_years: Option<usize>,

    /// Rolling mean window in months
    #[arg(long)]
    smoothing_window: Option<usize>,

    /// Output unit: celsius or fahrenheit
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Directory for report files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Evaluate every station in the archive instead of a single target
    #[arg(long)]
    all: bool,

    /// Number of stations evaluated concurrently with --all
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Skip writing CSV reports
    #[arg(long)]
    no_csv: bool,

    /// Also write HTML figures (needs the `plotting` feature)
    #[arg(long)]
    plot: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(archive) = &self.archive {
            config.archive = archive.clone();
        }
        if let Some(station) = &self.station {
            config.target_station = station.clone();
        }
        if let Some(radius_km) = self.radius_km {
            config.radius_km = radius_km;
        }
        if let (Some(start), Some(end)) = (&self.segment_start, &self.segment_end) {
            config.segment = Period::parse(start, end)?;
        }
        if let (Some(start), Some(end)) = (&self.normal_start, &self.normal_end) {
            config.normal = Period::parse(start, end)?;
        }
        if let Some(n) = self.min_baseline_years {
            config.min_baseline_years = n;
        }
        if let Some(n) = self.min_overlap_years {
            config.min_overlap_years = n;
        }
        if let Some(window) = self.smoothing_window {
            config.smoothing_window = window;
        }
        if let Some(unit) = self.unit {
            config.unit = unit;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn reporters(&self) -> Vec<Box<dyn Reporter>> {
        let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(LogReporter)];
        if !self.no_csv {
            reporters.push(Box::new(CsvReporter::new()));
        }
        #[cfg(feature = "plotting")]
        if self.plot {
            reporters.push(Box::new(baseline_estimator::PlotReporter));
        }
        #[cfg(not(feature = "plotting"))]
        if self.plot {
            warn!("--plot ignored: built without the `plotting` feature");
        }
        reporters
    }
}

fn report(outcome: &Outcome, config: &RunConfig, reporters: &[Box<dyn Reporter>]) -> Result<(), ReportError> {
    match outcome {
        Outcome::Estimated(evaluation) => {
            for reporter in reporters {
                reporter.render(evaluation, config)?;
            }
        }
        Outcome::NoEstimate {
            station_id,
            assessments,
            ..
        } => warn!(
            "{}: no estimate available ({} candidate donors, none admitted)",
            station_id,
            assessments.len()
        ),
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct BatchTally {
    estimated: usize,
    failed: usize,
    report_failures: usize,
}

/// Reports every batch result; one station failing never stops the others.
fn report_batch(
    results: Vec<(String, Result<Outcome, BaselineError>)>,
    config: &RunConfig,
    reporters: &[Box<dyn Reporter>],
) -> BatchTally {
    let mut tally = BatchTally::default();
    for (station, result) in results {
        match result {
            Ok(outcome) => {
                if outcome.evaluation().is_some() {
                    tally.estimated += 1;
                }
                let station_config = config.for_target(station.as_str());
                if let Err(e) = report(&outcome, &station_config, reporters) {
                    error!("{}: failed to write reports: {}", station, e);
                    tally.report_failures += 1;
                }
            }
            Err(e) => {
                error!("{}: {}", station, e);
                tally.failed += 1;
            }
        }
    }
    tally
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.run_config()?;
    let reporters = cli.reporters();

    let estimator = BaselineEstimator::from_archive(&config.archive, config.unit).await?;

    if cli.all {
        let start = Instant::now();
        let targets: Vec<String> = estimator.catalog().iter().map(|s| s.id.clone()).collect();
        let total = targets.len();
        let results = Arc::new(estimator)
            .evaluate_many(&config, targets, cli.concurrency)
            .await;
        let tally = report_batch(results, &config, &reporters);
        info!(
            "Estimated {} of {} stations in {:?} ({} failed, {} report failures)",
            tally.estimated,
            total,
            start.elapsed(),
            tally.failed,
            tally.report_failures
        );
    } else {
        let outcome = estimator.evaluate(&config)?;
        report(&outcome, &config, &reporters)?;
    }
    Ok(())
}
