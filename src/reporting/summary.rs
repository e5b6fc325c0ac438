use crate::config::RunConfig;
use crate::estimator::StationEvaluation;
use crate::reporting::{ReportError, Reporter};
use log::info;

/// Bin width of the donor-distance histogram.
const HISTOGRAM_BIN_KM: f64 = 20.0;

/// Human readable run summary through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn lines(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Vec<String> {
        let unit = evaluation.unit.symbol();
        let mut lines = vec![format!(
            "{} {}: {} of {} donors within {} km admitted (segment {}, normal {})",
            evaluation.station_id,
            evaluation.station_name,
            evaluation.ensemble_size,
            evaluation.assessments.len(),
            config.radius_km,
            config.segment,
            config.normal,
        )];

        let histogram = evaluation.neighbours.distance_histogram(HISTOGRAM_BIN_KM);
        if !histogram.is_empty() {
            let bins: Vec<String> = histogram
                .iter()
                .map(|(edge, count)| format!("{edge:.0}:{count}"))
                .collect();
            lines.push(format!("donor distances ({HISTOGRAM_BIN_KM} km bins): {}", bins.join(" ")));
        }
        for rejected in evaluation.rejected() {
            lines.push(format!(
                "excluded {} ({}) at {:.1} km",
                rejected.station_id, rejected.station_name, rejected.distance_km
            ));
        }

        lines.push(format!("month  estimate ({unit})   SE    truth ({unit})   SE    n12"));
        for (month, estimated) in evaluation.estimate.normal.entries().iter() {
            let truth = evaluation.truth.map(|t| t.entry(month));
            lines.push(format!(
                "{:>5}  {:>12.3} {:>6.3}  {:>10.3} {:>6.3} {:>5}",
                month.number(),
                estimated.mean,
                estimated.standard_error,
                truth.map_or(f64::NAN, |t| t.mean),
                truth.map_or(f64::NAN, |t| t.standard_error),
                estimated.count,
            ));
        }

        if let Some(report) = &evaluation.report {
            lines.push(format!(
                "mean error: normal {:.4}, SE {:.4}; mean difference SE {:.4}",
                report.error_normal, report.error_standard_error, report.mean_difference_standard_error
            ));
        }
        lines.push(format!(
            "long-run ({} month window): estimated level {:.3}, true level {:.3}, error {:.4}",
            config.smoothing_window,
            evaluation.long_run.estimated_level,
            evaluation.long_run.true_level,
            evaluation.long_run.error
        ));
        lines
    }
}

impl Reporter for LogReporter {
    fn render(&self, evaluation: &StationEvaluation, config: &RunConfig) -> Result<(), ReportError> {
        for line in self.lines(evaluation, config) {
            info!("{}", line);
        }
        Ok(())
    }
}
