use std::path::Path;

use crate::error::CsvError;
use crate::model::Project;
use crate::timeline::DayEstimate;

/// Export per-day estimates to a semicolon-delimited CSV file.
///
/// Columns: Project ; Date ; Hours ; Source ; Planned ; Completed
/// Dates are formatted as YYYY-MM-DD, hours with two decimals.
/// Returns the number of rows written.
pub fn export_day_estimates(
    rows: &[(&Project, Vec<DayEstimate>)],
    path: &Path,
) -> Result<usize, CsvError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["Project", "Date", "Hours", "Source", "Planned", "Completed"])?;

    let mut written = 0;
    for (project, estimates) in rows {
        for estimate in estimates {
            wtr.write_record([
                project.name.as_str(),
                &estimate.date.format("%Y-%m-%d").to_string(),
                &format!("{:.2}", estimate.hours),
                estimate.source.as_str(),
                yes_no(estimate.is_planned_event),
                yes_no(estimate.is_completed_event),
            ])?;
            written += 1;
        }
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(written)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
