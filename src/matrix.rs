//! Comparison matrix assembly
//!
//! Merges the variable universe of every column drawn from a table, orders it
//! canonically,
//! and fills one cell per (variable, column) with the coefficient text, its
//! paired standard error and a significance color. Three fixed summary rows
//! close the matrix.

use crate::canonical::{normalize_name, VariableOrder};
use crate::category::{ControlType, DependentCategory, Sample, Stage, UiMeasure};
use crate::select::Column;
use crate::table::SummaryKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Leading floating-point prefix, as lenient number parsers accept it
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Opacity for coefficients carrying a significance marker
pub const SIGNIFICANT_OPACITY: f32 = 1.0;
/// Opacity for coefficients without a marker
pub const PLAIN_OPACITY: f32 = 0.6;

/// Color family by coefficient sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hue {
    /// Zero included
    NonNegative,
    Negative,
}

impl Hue {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Hue::NonNegative => (0, 128, 0),
            Hue::Negative => (192, 0, 0),
        }
    }
}

/// Display color of a numeric coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignificanceColor {
    pub hue: Hue,
    pub opacity: f32,
}

impl SignificanceColor {
    /// CSS `rgba()` form
    pub fn css(&self) -> String {
        let (r, g, b) = self.hue.rgb();
        format!("rgba({}, {}, {}, {})", r, g, b, self.opacity)
    }
}

/// Color for a coefficient string; `None` when it does not start with a number
///
/// Any `*` marks significance. Sign is read from the parsed prefix, so
/// `"0.00000"` and `"-0"` both count as non-negative.
pub fn significance_color(text: &str) -> Option<SignificanceColor> {
    let prefix = LEADING_NUMBER.find(text)?;
    let value: f64 = prefix.as_str().trim().parse().ok()?;

    let hue = if value < 0.0 {
        Hue::Negative
    } else {
        Hue::NonNegative
    };
    let opacity = if text.contains('*') {
        SIGNIFICANT_OPACITY
    } else {
        PLAIN_OPACITY
    };

    Some(SignificanceColor { hue, opacity })
}

/// One (variable, column) cell; an empty coefficient renders blank
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub coefficient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<SignificanceColor>,
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        self.coefficient.is_empty()
    }
}

/// Column descriptor shown in the matrix header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub label: String,
    pub dep: DependentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiMeasure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Sample>,
    /// Whether any candidate table matched the column's categories
    pub has_source: bool,
    /// Whether the column resolved to a source table column
    pub bound: bool,
}

impl From<&Column<'_>> for ColumnHeader {
    fn from(column: &Column<'_>) -> Self {
        Self {
            label: column.label(),
            dep: column.dep,
            ui: column.ui,
            control: column.control,
            stage: column.stage,
            sample: column.sample,
            has_source: column.source.is_some(),
            bound: column.is_bound(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub variable: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub values: Vec<Option<String>>,
}

/// Structured result handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMatrix {
    pub header: Vec<ColumnHeader>,
    pub rows: Vec<MatrixRow>,
    pub summary_rows: Vec<SummaryRow>,
}

impl ComparisonMatrix {
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Row for a variable, matched by normalized name
    pub fn row(&self, variable: &str) -> Option<&MatrixRow> {
        let wanted = normalize_name(variable);
        self.rows.iter().find(|r| normalize_name(&r.variable) == wanted)
    }
}

/// Variable names of every source table, first spelling kept per normalized name
///
/// A column whose source matched but whose column stayed unresolved still
/// contributes its table's variables; its cells read blank.
pub fn variable_universe(columns: &[Column<'_>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for record in columns.iter().filter_map(|c| c.source) {
        for coefficient in record.table.coefficients() {
            if seen.insert(normalize_name(&coefficient.variable)) {
                names.push(coefficient.variable.clone());
            }
        }
    }

    names
}

/// Build the matrix for selected columns
pub fn assemble(columns: &[Column<'_>], order: &VariableOrder, is_iv: bool) -> ComparisonMatrix {
    let variables = order.sort(variable_universe(columns).as_slice(), is_iv);

    let rows: Vec<MatrixRow> = variables
        .into_iter()
        .map(|variable| {
            let normalized = normalize_name(&variable);
            let cells = columns.iter().map(|c| cell_for(c, &normalized)).collect();
            MatrixRow { variable, cells }
        })
        .collect();

    let summary_rows = SummaryKind::ALL
        .into_iter()
        .map(|kind| SummaryRow {
            metric: kind.label().to_string(),
            values: columns
                .iter()
                .map(|c| c.summary(kind).map(str::to_string))
                .collect(),
        })
        .collect();

    debug!(columns = columns.len(), rows = rows.len(), "assembled matrix");

    ComparisonMatrix {
        header: columns.iter().map(ColumnHeader::from).collect(),
        rows,
        summary_rows,
    }
}

fn cell_for(column: &Column<'_>, normalized: &str) -> Cell {
    let Some((table, key)) = column.binding() else {
        return Cell::default();
    };
    let Some(coefficient) = table.coefficient(normalized) else {
        return Cell::default();
    };

    let text = coefficient.value(key).trim();
    if text.is_empty() {
        return Cell::default();
    }

    Cell {
        coefficient: text.to_string(),
        standard_error: coefficient.standard_error(key).map(str::to_string),
        color: significance_color(text),
    }
}
