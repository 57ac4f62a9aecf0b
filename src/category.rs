//! Semantic categories inferred for tables and requested by filters
//!
//! Every enum derives `Ord` in its canonical display order, so ordered sets of
//! categories iterate the way the comparison matrix lays out its columns.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model specification of a table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Specification {
    /// Plain regression without an instrumented regressor
    Baseline,
    /// Either stage of a two-stage instrumented design
    Iv,
}

impl Specification {
    pub fn label(self) -> &'static str {
        match self {
            Specification::Baseline => "baseline",
            Specification::Iv => "iv",
        }
    }
}

/// Outcome variable of a table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum DependentCategory {
    #[serde(rename = "3m")]
    #[value(name = "3m")]
    ThreeMonths,
    #[serde(rename = "3m_log")]
    #[value(name = "3m_log")]
    ThreeMonthsLog,
    #[serde(rename = "6m")]
    #[value(name = "6m")]
    SixMonths,
    #[serde(rename = "6m_log")]
    #[value(name = "6m_log")]
    SixMonthsLog,
    #[serde(rename = "wealth")]
    #[value(name = "wealth")]
    Wealth,
    /// Unrecognized outcome; no filter can request it
    #[serde(rename = "other")]
    #[value(skip)]
    Other,
}

impl DependentCategory {
    /// Categories a filter may request, in canonical column order
    pub const SELECTABLE: [DependentCategory; 5] = [
        DependentCategory::ThreeMonths,
        DependentCategory::ThreeMonthsLog,
        DependentCategory::SixMonths,
        DependentCategory::SixMonthsLog,
        DependentCategory::Wealth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DependentCategory::ThreeMonths => "3m",
            DependentCategory::ThreeMonthsLog => "3m_log",
            DependentCategory::SixMonths => "6m",
            DependentCategory::SixMonthsLog => "6m_log",
            DependentCategory::Wealth => "wealth",
            DependentCategory::Other => "other",
        }
    }

    /// Human-readable column heading
    pub fn title(self) -> &'static str {
        match self {
            DependentCategory::ThreeMonths => "Δ wealth, 3 months",
            DependentCategory::ThreeMonthsLog => "Δ log wealth, 3 months",
            DependentCategory::SixMonths => "Δ wealth, 6 months",
            DependentCategory::SixMonthsLog => "Δ log wealth, 6 months",
            DependentCategory::Wealth => "Wealth at end",
            DependentCategory::Other => "Other outcome",
        }
    }
}

/// Operationalization of unemployment-insurance benefit size
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum UiMeasure {
    #[value(name = "avg_ui_linear")]
    AvgUiLinear,
    #[value(name = "avg_ui_log")]
    AvgUiLog,
    #[value(name = "median_ui")]
    MedianUi,
    #[value(name = "median_ui_log")]
    MedianUiLog,
    /// Table carries no UI-size regressor
    #[serde(rename = "none")]
    #[value(skip)]
    Absent,
}

impl UiMeasure {
    /// Measures in detection priority order (first present wins)
    pub const PRIORITY: [UiMeasure; 4] = [
        UiMeasure::AvgUiLinear,
        UiMeasure::AvgUiLog,
        UiMeasure::MedianUi,
        UiMeasure::MedianUiLog,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UiMeasure::AvgUiLinear => "avg_ui_linear",
            UiMeasure::AvgUiLog => "avg_ui_log",
            UiMeasure::MedianUi => "median_ui",
            UiMeasure::MedianUiLog => "median_ui_log",
            UiMeasure::Absent => "none",
        }
    }

    /// Regressor name carrying this measure in a table (compared case-insensitively)
    pub fn variable_name(self) -> Option<&'static str> {
        match self {
            UiMeasure::Absent => None,
            other => Some(other.label()),
        }
    }
}

/// Which age regressors (and interactions) a column controls for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Exclude,
    Include,
    Interaction,
    #[value(name = "age2_control")]
    Age2Control,
    #[value(name = "age2_interaction")]
    Age2Interaction,
}

impl ControlType {
    pub const ALL: [ControlType; 5] = [
        ControlType::Exclude,
        ControlType::Include,
        ControlType::Interaction,
        ControlType::Age2Control,
        ControlType::Age2Interaction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ControlType::Exclude => "exclude",
            ControlType::Include => "include",
            ControlType::Interaction => "interaction",
            ControlType::Age2Control => "age2_control",
            ControlType::Age2Interaction => "age2_interaction",
        }
    }
}

/// Stage of an instrumented design
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    First,
    Second,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::First => "first",
            Stage::Second => "second",
        }
    }
}

/// Estimation sample of an instrumented column, recognized by its observation count
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    Whole,
    #[value(name = "lottery_scp")]
    LotteryScp,
    #[value(name = "lottery_only")]
    LotteryOnly,
    #[value(skip)]
    Unknown,
}

impl Sample {
    pub fn label(self) -> &'static str {
        match self {
            Sample::Whole => "whole",
            Sample::LotteryScp => "lottery_scp",
            Sample::LotteryOnly => "lottery_only",
            Sample::Unknown => "unknown",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(
    Specification,
    DependentCategory,
    UiMeasure,
    ControlType,
    Stage,
    Sample
);
