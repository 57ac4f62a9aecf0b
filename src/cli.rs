//! CLI argument parsing for regmatrix

use crate::category::{ControlType, DependentCategory, Sample, Specification, Stage, UiMeasure};
use crate::filter::FilterRequest;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the comparison matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "regmatrix")]
#[command(version)]
#[command(
    about = "Classify regression-result tables and assemble a filtered comparison matrix",
    long_about = None
)]
pub struct Cli {
    /// JSON file holding an array of exported regression tables
    #[arg(short = 't', long = "tables", value_name = "FILE")]
    pub tables: PathBuf,

    /// Model specification to compare
    #[arg(short = 's', long = "spec", value_enum, default_value = "baseline")]
    pub spec: Specification,

    /// Dependent-variable categories (e.g., --dep 3m,6m_log)
    #[arg(long = "dep", value_enum, value_delimiter = ',', default_value = "3m")]
    pub deps: Vec<DependentCategory>,

    /// UI-size measures
    #[arg(long = "ui", value_enum, value_delimiter = ',', default_value = "avg_ui_linear")]
    pub ui: Vec<UiMeasure>,

    /// Do not constrain the UI measure (one column per dep/control pair)
    #[arg(long = "any-ui", conflicts_with = "ui")]
    pub any_ui: bool,

    /// Age-control configurations
    #[arg(long = "control", value_enum, value_delimiter = ',', default_value = "include")]
    pub controls: Vec<ControlType>,

    /// Instrumented stages (iv only)
    #[arg(long = "stage", value_enum, value_delimiter = ',', default_value = "first,second")]
    pub stages: Vec<Stage>,

    /// Instrumented estimation samples (iv only)
    #[arg(long = "sample", value_enum, value_delimiter = ',', default_value = "whole")]
    pub samples: Vec<Sample>,

    /// Output format (text, json or csv)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit standard errors from text and CSV output
    #[arg(long = "no-se")]
    pub no_standard_errors: bool,

    /// Presentation config TOML (variable order, sample thresholds)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report tables no filter can reach and anomalous control columns
    #[arg(long = "diagnostics")]
    pub diagnostics: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Immutable filter request for this invocation
    pub fn filter_request(&self) -> FilterRequest {
        FilterRequest::new(self.spec)
            .with_deps(self.deps.iter().copied())
            .with_ui(self.ui.iter().copied().filter(|_| !self.any_ui))
            .with_controls(self.controls.iter().copied())
            .with_stages(self.stages.iter().copied())
            .with_samples(self.samples.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["regmatrix", "--tables", "tables.json"]);
        assert_eq!(cli.tables, PathBuf::from("tables.json"));
        assert_eq!(cli.spec, Specification::Baseline);
        assert_eq!(cli.deps, vec![DependentCategory::ThreeMonths]);
        assert_eq!(cli.ui, vec![UiMeasure::AvgUiLinear]);
        assert_eq!(cli.controls, vec![ControlType::Include]);
        assert_eq!(cli.stages, vec![Stage::First, Stage::Second]);
        assert_eq!(cli.samples, vec![Sample::Whole]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.diagnostics);
        assert!(!cli.debug);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_comma_separated_lists() {
        let cli = Cli::parse_from([
            "regmatrix",
            "-t",
            "t.json",
            "--dep",
            "6m_log,3m",
            "--control",
            "exclude,age2_interaction",
            "--ui",
            "median_ui,avg_ui_log",
        ]);
        assert_eq!(
            cli.deps,
            vec![DependentCategory::SixMonthsLog, DependentCategory::ThreeMonths]
        );
        assert_eq!(
            cli.controls,
            vec![ControlType::Exclude, ControlType::Age2Interaction]
        );
        assert_eq!(cli.ui, vec![UiMeasure::MedianUi, UiMeasure::AvgUiLog]);
    }

    #[test]
    fn test_cli_any_ui() {
        let cli = Cli::parse_from(["regmatrix", "-t", "t.json", "--any-ui"]);
        assert!(cli.any_ui);
        assert!(cli.filter_request().ui.is_empty());
        assert_eq!(
            cli.filter_request().ui_choices(DependentCategory::ThreeMonths),
            vec![None]
        );
    }

    #[test]
    fn test_cli_iv_request() {
        let cli = Cli::parse_from([
            "regmatrix",
            "-t",
            "t.json",
            "--spec",
            "iv",
            "--stage",
            "second",
            "--sample",
            "whole,lottery_only",
            "--format",
            "json",
        ]);
        let filter = cli.filter_request();
        assert!(filter.is_iv());
        assert!(filter.accepts_stage_sample(Stage::Second, Sample::LotteryOnly));
        assert!(!filter.accepts_stage_sample(Stage::First, Sample::Whole));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_rejects_unselectable_categories() {
        assert!(Cli::try_parse_from(["regmatrix", "-t", "t.json", "--dep", "other"]).is_err());
        assert!(Cli::try_parse_from(["regmatrix", "-t", "t.json", "--sample", "unknown"]).is_err());
        assert!(Cli::try_parse_from(["regmatrix", "-t", "t.json", "--ui", "none"]).is_err());
    }

    #[test]
    fn test_cli_requires_tables() {
        assert!(Cli::try_parse_from(["regmatrix"]).is_err());
        assert!(
            Cli::try_parse_from(["regmatrix", "-t", "t.json", "--ui", "median_ui", "--any-ui"])
                .is_err()
        );
    }
}
