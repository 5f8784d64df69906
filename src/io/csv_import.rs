use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::CsvError;
use crate::model::Holiday;

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Start,
    End,
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "name" | "holiday" | "holidayname" | "title" | "label" | "description" => {
            Some(Column::Name)
        }
        "date" | "start" | "startdate" | "from" | "begin" | "day" => Some(Column::Start),
        "end" | "enddate" | "to" | "until" | "finish" => Some(Column::End),
        _ => None,
    }
}

/// Import holidays from a CSV file.
///
/// Auto-detects the delimiter (semicolon, comma, tab) and matches headers
/// loosely ("Holiday", "Start Date", "Until", ...). A missing or blank end
/// column means a single-day holiday; a missing name falls back to
/// "Holiday". Returns `(holidays, skipped_rows)`.
pub fn import_holidays(path: &Path) -> Result<(Vec<Holiday>, usize), CsvError> {
    let content = std::fs::read_to_string(path).map_err(|source| CsvError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_holidays(&content)
}

pub fn parse_holidays(content: &str) -> Result<(Vec<Holiday>, usize), CsvError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    if !columns.contains(&Some(Column::Start)) {
        return Err(CsvError::MissingColumns(
            headers.iter().map(str::to_string).collect(),
        ));
    }

    let mut holidays = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut name = None;
        let mut start = None;
        let mut end = None;
        for (field, column) in record.iter().zip(&columns) {
            match column {
                Some(Column::Name) => name = Some(field.to_string()),
                Some(Column::Start) => start = Some(field.to_string()),
                Some(Column::End) => end = Some(field.to_string()),
                None => {}
            }
        }

        let Some(start_date) = start.as_deref().and_then(parse_date) else {
            warn!(row, value = start.as_deref().unwrap_or(""), "skipping row with invalid date");
            skipped += 1;
            continue;
        };

        let end_date = match end.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match parse_date(raw) {
                Some(d) => Some(d),
                None => {
                    warn!(row, value = raw, "skipping row with invalid end date");
                    skipped += 1;
                    continue;
                }
            },
        };

        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Holiday".to_string());

        holidays.push(match end_date {
            Some(end_date) => Holiday::range(name, start_date, end_date),
            None => Holiday::new(name, start_date),
        });
    }

    if holidays.is_empty() && skipped > 0 {
        return Err(CsvError::NoValidRows(skipped));
    }
    if holidays.is_empty() {
        return Err(CsvError::Empty);
    }

    Ok((holidays, skipped))
}
