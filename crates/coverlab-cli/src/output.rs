//! Output formatting for the CLI.

use crate::config::{OutputFormat, Profile};
use crate::error::Result;
use colored::*;
use coverlab_domain::{IntervalResult, LedgerRecord, COLUMNS};
use coverlab_sdk::{ClassSummary, CoverageCounts, Parameters};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one computed interval.
    pub fn format_interval(&self, student_id: &str, result: &IntervalResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "student_id": student_id,
                "confidence_level": result.confidence_level.percent(),
                "sample_mean": result.sample_mean,
                "margin_of_error": result.margin_of_error,
                "lower_bound": result.lower_bound,
                "upper_bound": result.upper_bound,
                "captures_mean": result.captures_mean,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "{:.4} {:.4} {}",
                result.lower_bound,
                result.upper_bound,
                coverlab_domain::Capture::from(result.captures_mean)
            )),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Student", student_id]);
                builder.push_record(["Confidence level", result.confidence_level.label()]);
                builder.push_record(["Sample mean (x̄)", &format!("{:.4}", result.sample_mean)]);
                builder.push_record(["Margin of error", &format!("{:.4}", result.margin_of_error)]);
                builder.push_record([
                    "Interval",
                    &format!("[{:.4}, {:.4}]", result.lower_bound, result.upper_bound),
                ]);

                let mut table = builder.build();
                table.with(Style::rounded());

                let verdict = if result.captures_mean {
                    self.colorize("Your interval captures μ", "green")
                } else {
                    self.colorize("Your interval does not capture μ", "red")
                };
                Ok(format!("{}\n{}", table, verdict))
            }
        }
    }

    /// Format ledger records in insertion order.
    pub fn format_records(&self, records: &[LedgerRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = records
                    .iter()
                    .map(|r| {
                        json!({
                            COLUMNS[0]: r.student_id,
                            COLUMNS[1]: r.confidence_level.label(),
                            COLUMNS[2]: r.sample_mean,
                            COLUMNS[3]: r.margin_of_error,
                            COLUMNS[4]: r.lower_bound,
                            COLUMNS[5]: r.upper_bound,
                            COLUMNS[6]: r.capture().as_str(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| format!("{}\t{}", r.student_id, r.capture()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No results yet.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Student", "Level", "x̄", "Margin", "LI", "LS", "Captures μ"]);

                for (i, r) in records.iter().enumerate() {
                    let capture = if r.captures_mean {
                        self.colorize(r.capture().as_str(), "green")
                    } else {
                        self.colorize(r.capture().as_str(), "red")
                    };
                    builder.push_record([
                        (i + 1).to_string(),
                        r.student_id.clone(),
                        r.confidence_level.label().to_string(),
                        format!("{:.4}", r.sample_mean),
                        format!("{:.4}", r.margin_of_error),
                        format!("{:.4}", r.lower_bound),
                        format!("{:.4}", r.upper_bound),
                        capture,
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format the class-wide coverage summary.
    pub fn format_summary(&self, summary: &ClassSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_level: serde_json::Map<String, serde_json::Value> = summary
                    .by_level
                    .iter()
                    .map(|(level, counts)| (level.clone(), counts_json(counts)))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "overall": counts_json(&summary.overall),
                    "by_level": by_level,
                }))?)
            }
            OutputFormat::Quiet => Ok(format!(
                "{}/{}",
                summary.overall.captured_count, summary.overall.total
            )),
            OutputFormat::Table => {
                if summary.overall.total == 0 {
                    return Ok(self.colorize("No results yet.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Level", "Total", "Captured", "Missed", "Error rate", "Expected"]);
                for (level, counts) in &summary.by_level {
                    builder.push_record(summary_row(level, counts));
                }
                builder.push_record(summary_row("All", &summary.overall));

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let headline = format!(
                    "{} of {} intervals captured μ ({:.2}%)",
                    summary.overall.captured_count,
                    summary.overall.total,
                    summary.overall.coverage_percent
                );
                Ok(format!("{}\n{}", table, self.colorize(&headline, "cyan")))
            }
        }
    }

    /// Format the public exercise parameters.
    pub fn format_parameters(&self, params: &Parameters) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "population_mean": params.population_mean,
                "population_std_dev": params.population_std_dev,
                "sample_size": params.sample_size,
                "min_allowed_value": params.min_allowed_value,
                "max_allowed_value": params.max_allowed_value,
                "standard_error": params.standard_error,
                "confidence_levels": params.confidence_levels,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "{} {} {} {}",
                params.population_std_dev,
                params.sample_size,
                params.min_allowed_value,
                params.max_allowed_value
            )),
            OutputFormat::Table => {
                let levels = params
                    .confidence_levels
                    .iter()
                    .map(|l| format!("{}%", l))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mean = params
                    .population_mean
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "hidden".to_string());

                let mut builder = Builder::default();
                builder.push_record(["Population mean (μ)", &mean]);
                builder.push_record(["Population std dev (σ)", &params.population_std_dev.to_string()]);
                builder.push_record(["Sample size (n)", &params.sample_size.to_string()]);
                builder.push_record([
                    "Allowed values",
                    &format!("[{}, {}]", params.min_allowed_value, params.max_allowed_value),
                ]);
                builder.push_record(["Standard error (σ/√n)", &format!("{:.4}", params.standard_error)]);
                builder.push_record(["Confidence levels", &levels]);

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format connection profiles, marking the active one.
    pub fn format_profiles<'a>(
        &self,
        profiles: impl IntoIterator<Item = (&'a String, &'a Profile)>,
        active: &str,
    ) -> Result<String> {
        let profiles: Vec<_> = profiles.into_iter().collect();
        match self.format {
            OutputFormat::Json => {
                let items: Vec<_> = profiles
                    .iter()
                    .map(|(name, p)| {
                        json!({
                            "name": name,
                            "router_url": p.router_url,
                            "student_id": p.student_id,
                            "active": name.as_str() == active,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Quiet => Ok(profiles
                .iter()
                .map(|(name, p)| format!("{}\t{}", name, p.router_url))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if profiles.is_empty() {
                    return Ok(self.info("No profiles configured"));
                }

                let mut builder = Builder::default();
                builder.push_record(["", "Profile", "Service URL", "Student"]);
                for (name, p) in &profiles {
                    let marker = if name.as_str() == active { "*" } else { "" };
                    builder.push_record([
                        marker.to_string(),
                        name.to_string(),
                        p.router_url.clone(),
                        p.student_id.clone().unwrap_or_else(|| "-".to_string()),
                    ]);
                }

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn counts_json(counts: &CoverageCounts) -> serde_json::Value {
    json!({
        "total": counts.total,
        "captured_count": counts.captured_count,
        "missed_count": counts.missed_count,
        "error_rate_percent": counts.error_rate_percent,
        "coverage_percent": counts.coverage_percent,
        "expected_error_rate_percent": counts.expected_error_rate_percent,
    })
}

fn summary_row(label: &str, counts: &CoverageCounts) -> [String; 6] {
    [
        label.to_string(),
        counts.total.to_string(),
        counts.captured_count.to_string(),
        counts.missed_count.to_string(),
        format!("{:.2}%", counts.error_rate_percent),
        counts
            .expected_error_rate_percent
            .map(|e| format!("{}%", e))
            .unwrap_or_else(|| "-".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverlab_domain::{compute_interval, ConfidenceLevel, PopulationParameters};
    use std::collections::BTreeMap;

    fn create_test_record(student: &str, captured: bool) -> LedgerRecord {
        LedgerRecord {
            student_id: student.to_string(),
            confidence_level: ConfidenceLevel::NinetyFive,
            sample_mean: 100.5,
            margin_of_error: 1.0735,
            lower_bound: 99.4265,
            upper_bound: 101.5735,
            captures_mean: captured,
        }
    }

    fn create_test_summary() -> ClassSummary {
        let counts = CoverageCounts {
            total: 3,
            captured_count: 2,
            missed_count: 1,
            error_rate_percent: 100.0 / 3.0,
            coverage_percent: 200.0 / 3.0,
            expected_error_rate_percent: Some(5.0),
        };
        let mut by_level = BTreeMap::new();
        by_level.insert("95%".to_string(), counts.clone());
        ClassSummary {
            overall: counts,
            by_level,
        }
    }

    #[test]
    fn test_records_json_uses_column_names() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_records(&[create_test_record("ana", true)])
            .unwrap();
        assert!(output.contains("ID_Estudiante"));
        assert!(output.contains("Captura_Mu"));
        assert!(output.contains("SÍ"));
    }

    #[test]
    fn test_records_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .format_records(&[create_test_record("ana", true), create_test_record("luis", false)])
            .unwrap();
        assert_eq!(output, "ana\tSÍ\nluis\tNO");
    }

    #[test]
    fn test_records_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_records(&[create_test_record("ana", false)])
            .unwrap();
        assert!(output.contains("Student"));
        assert!(output.contains("ana"));
        assert!(output.contains("NO"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[]).unwrap();
        assert!(output.contains("No results yet"));
    }

    #[test]
    fn test_interval_table_verdict() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let params = PopulationParameters::default();
        let result = compute_interval(100.5, ConfidenceLevel::NinetyFive, &params);
        let output = formatter.format_interval("ana", &result).unwrap();
        assert!(output.contains("95%"));
        assert!(output.contains("captures μ"));
        assert!(!output.contains("does not"));
    }

    #[test]
    fn test_interval_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let params = PopulationParameters::default();
        let result = compute_interval(103.0, ConfidenceLevel::NinetyFive, &params);
        let output = formatter.format_interval("ana", &result).unwrap();
        assert!(output.ends_with("NO"));
    }

    #[test]
    fn test_summary_formats() {
        let summary = create_test_summary();

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_summary(&summary)
            .unwrap();
        assert_eq!(quiet, "2/3");

        let table = Formatter::new(OutputFormat::Table, false)
            .format_summary(&summary)
            .unwrap();
        assert!(table.contains("33.33%"));
        assert!(table.contains("2 of 3 intervals captured μ"));

        let json = Formatter::new(OutputFormat::Json, false)
            .format_summary(&summary)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["overall"]["missed_count"], 1);
        assert_eq!(value["by_level"]["95%"]["expected_error_rate_percent"], 5.0);
    }

    #[test]
    fn test_hidden_population_mean() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let params = Parameters {
            population_mean: None,
            population_std_dev: 3.0,
            sample_size: 30,
            min_allowed_value: 90.0,
            max_allowed_value: 110.0,
            standard_error: 3.0 / 30f64.sqrt(),
            confidence_levels: vec![90, 95, 99],
        };
        let output = formatter.format_parameters(&params).unwrap();
        assert!(output.contains("hidden"));
        assert!(output.contains("90%, 95%, 99%"));
    }

    #[test]
    fn test_profiles_mark_active() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "aula".to_string(),
            Profile {
                router_url: "http://10.0.0.5:8080".to_string(),
                student_id: Some("ana".to_string()),
            },
        );
        profiles.insert(
            "default".to_string(),
            Profile {
                router_url: "http://localhost:8080".to_string(),
                student_id: None,
            },
        );

        let json = Formatter::new(OutputFormat::Json, false)
            .format_profiles(&profiles, "aula")
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "aula");
        assert_eq!(parsed[0]["active"], true);
        assert_eq!(parsed[1]["active"], false);
        assert!(parsed[1]["student_id"].is_null());

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_profiles(&profiles, "aula")
            .unwrap();
        assert_eq!(quiet, "aula\thttp://10.0.0.5:8080\ndefault\thttp://localhost:8080");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
