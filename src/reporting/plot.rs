use crate::config::RunConfig;
use crate::estimator::StationEvaluation;
use crate::reporting::csv::monthly_frame;
use crate::reporting::{ensure_output_dir, ReportError, Reporter};
use log::info;
use plotlars::{LinePlot, Plot, Text};
use polars::prelude::*;

/// HTML figures: monthly normals with their SEs, and the smoothed long-run traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotReporter;

fn long_run_frame(evaluation: &StationEvaluation) -> PolarsResult<DataFrame> {
    let run = &evaluation.long_run;
    let month: Vec<u32> = (0..run.truth_trace.len() as u32).collect();
    df!(
        "month" => month,
        "truth" => run.truth_trace.values().to_vec(),
        "estimate" => run.estimate_trace.values().to_vec(),
    )
}

impl Reporter for PlotReporter {
    fn render(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Result<(), ReportError> {
        let dir = ensure_output_dir(config)?;
        let y_title = format!("Temperature ({})", evaluation.unit.symbol());

        let normals_path = dir.join(format!("{}-normals.html", evaluation.station_id));
        LinePlot::builder()
            .data(&monthly_frame(evaluation)?)
            .x("month")
            .y("estimate_mean")
            .additional_lines(vec!["truth_mean", "estimate_se", "truth_se"])
            .plot_title(Text::from(format!("{} monthly normals", evaluation.station_id).as_str()))
            .x_title("Month")
            .y_title(Text::from(y_title.as_str()))
            .build()
            .write_html(normals_path.to_string_lossy().into_owned());
        info!("Wrote {}", normals_path.display());

        let long_run_path = dir.join(format!("{}-long-run.html", evaluation.station_id));
        LinePlot::builder()
            .data(&long_run_frame(evaluation)?)
            .x("month")
            .y("truth")
            .additional_lines(vec!["estimate"])
            .plot_title(Text::from(
                format!(
                    "{} {}-month rolling mean, error {:.3}",
                    evaluation.station_id, config.smoothing_window, evaluation.long_run.error
                )
                .as_str(),
            ))
            .x_title(Text::from(format!("Months since {}", config.normal.start()).as_str()))
            .y_title(Text::from(y_title.as_str()))
            .build()
            .write_html(long_run_path.to_string_lossy().into_owned());
        info!("Wrote {}", long_run_path.display());
        Ok(())
    }
}
