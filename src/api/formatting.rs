//! Report output formatting
//!
//! CSV and JSON render the flat [`MetricsRecord`] rows. The text formatter is
//! meant for terminals and reads the full [`CaseReport`].

use crate::api::types::{CaseReport, MetricsRecord};
use crate::core::Localization;
use crate::validation::accuracy::AccuracySummary;
use std::fmt;
use std::str::FromStr;

/// Output formats supported by the command-line runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format '{}', expected csv, json or text", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// One line per case instead of a block
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Format one case report
    pub fn format_text(&self, report: &CaseReport) -> String {
        let error = report
            .error_m
            .map_or_else(|| "unknown".to_string(), |e| format!("{:.3} m", e));

        let result = match &report.localization {
            Localization::Estimated(result) => result,
            Localization::InsufficientObservers { usable } => {
                return format!(
                    "Case {}: not located ({} of {} observers usable)\n",
                    report.case_id, usable, report.observer_count
                );
            }
        };

        if self.compact {
            return format!(
                "Case {}: {:.6}, {:.6}, {:.1} m | {} | obs {}/{} pairs {} | error {}\n",
                report.case_id,
                result.position.lat,
                result.position.lon,
                result.position.height_or_zero(),
                result.method,
                result.observers_used,
                report.observer_count,
                result.pairs_used,
                error
            );
        }

        let mut output = format!("Case {}:\n", report.case_id);
        output.push_str(&format!("  Latitude:  {:.6}°\n", result.position.lat));
        output.push_str(&format!("  Longitude: {:.6}°\n", result.position.lon));
        output.push_str(&format!("  Altitude:  {:.1} m\n", result.position.height_or_zero()));
        output.push_str(&format!("  Method:    {}\n", result.method));
        output.push_str(&format!("  Observers: {} of {}\n", result.observers_used, report.observer_count));
        output.push_str(&format!("  Pairs:     {}\n", result.pairs_used));
        output.push_str(&format!("  Error:     {}\n", error));

        if !report.observer_ranges.is_empty() {
            output.push_str("  Observer ranges:\n");
            for range in &report.observer_ranges {
                output.push_str(&format!("    #{}: {:.1} m\n", range.observer_id, range.distance_m));
            }
        }

        output
    }

    /// Format the batch summary
    pub fn format_summary(&self, summary: &AccuracySummary) -> String {
        let meters = |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3} m", v));

        let mut output = String::from("Summary:\n");
        output.push_str(&format!(
            "  Cases:      {} ({} located, {} with ground truth)\n",
            summary.case_count, summary.located_count, summary.with_truth_count
        ));
        output.push_str(&format!(
            "  Methods:    {} triangulated, {} fallback\n",
            summary.triangulated_count, summary.fallback_count
        ));
        output.push_str(&format!("  Mean:       {}\n", meters(summary.mean_error_m)));
        output.push_str(&format!("  Median:     {}\n", meters(summary.median_error_m)));
        output.push_str(&format!("  RMSE:       {}\n", meters(summary.rmse_m)));
        output.push_str(&format!("  95th pct:   {}\n", meters(summary.error_95_percentile_m)));
        output.push_str(&format!(
            "  Range:      {} .. {}\n",
            meters(summary.min_error_m),
            meters(summary.max_error_m)
        ));
        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Format one record as a JSON object
    pub fn format_json(&self, record: &MetricsRecord) -> Result<String, serde_json::Error> {
        self.render(record)
    }

    /// Format all records as a JSON array
    pub fn format_records(&self, records: &[MetricsRecord]) -> Result<String, serde_json::Error> {
        self.render(&records)
    }

    pub fn format_summary(&self, summary: &AccuracySummary) -> Result<String, serde_json::Error> {
        self.render(summary)
    }

    fn render<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

/// CSV formatter for metrics rows
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Include header row
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header row in field order
    pub fn header(&self) -> String {
        MetricsRecord::FIELDS.join(",")
    }

    /// Format one record as a CSV row; missing values are empty cells
    pub fn format_csv(&self, record: &MetricsRecord) -> String {
        record
            .values()
            .map(|value| escape(&value.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Header (if enabled) plus one line per record
    pub fn format_records(&self, records: &[MetricsRecord]) -> String {
        let mut output = String::new();
        if self.include_header {
            output.push_str(&self.header());
            output.push('\n');
        }
        for record in records {
            output.push_str(&self.format_csv(record));
            output.push('\n');
        }
        output
    }
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
