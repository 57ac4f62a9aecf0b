//! Table records: ingestion of exported regression-result tables
//!
//! A table arrives as JSON rows of `variable` plus column cells keyed
//! `"(1)"`, `"(2)"`, `"(3)"`, followed by summary metric rows. Rows with an
//! empty variable name carry the standard error of the preceding named row;
//! ingestion attaches those to their coefficient once so lookups never
//! re-scan row adjacency.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Numbered result column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "(1)")]
    One,
    #[serde(rename = "(2)")]
    Two,
    #[serde(rename = "(3)")]
    Three,
}

impl ColumnKey {
    /// All column keys in display order
    pub const ALL: [ColumnKey; 3] = [ColumnKey::One, ColumnKey::Two, ColumnKey::Three];

    /// Zero-based position, also the index into summary metric values
    pub fn index(self) -> usize {
        match self {
            ColumnKey::One => 0,
            ColumnKey::Two => 1,
            ColumnKey::Three => 2,
        }
    }

    /// Key as written in the exported table (e.g. `"(2)"`)
    pub fn label(self) -> &'static str {
        match self {
            ColumnKey::One => "(1)",
            ColumnKey::Two => "(2)",
            ColumnKey::Three => "(3)",
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accept strings, numbers, booleans or null for a cell; anything absent is empty.
fn cell_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// One data row exactly as exported
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default, deserialize_with = "cell_text")]
    pub variable: String,
    #[serde(rename = "(1)", default, deserialize_with = "cell_text")]
    pub col1: String,
    #[serde(rename = "(2)", default, deserialize_with = "cell_text")]
    pub col2: String,
    #[serde(rename = "(3)", default, deserialize_with = "cell_text")]
    pub col3: String,
}

/// One summary metric row exactly as exported
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetric {
    #[serde(default, deserialize_with = "cell_text")]
    pub metric: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub value: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub value2: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub value3: String,
}

/// A whole exported table before ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    #[serde(rename = "dependentVariable", default, deserialize_with = "cell_text")]
    pub dependent_variable: String,
    #[serde(default)]
    pub data: Vec<RawRow>,
    #[serde(default)]
    pub summary: Vec<RawMetric>,
}

/// A data row with its cells indexed by column position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub variable: String,
    pub cells: [String; 3],
}

impl TableRow {
    /// Cell text for a column (may be empty)
    pub fn cell(&self, key: ColumnKey) -> &str {
        &self.cells[key.index()]
    }

    /// Whether the column holds non-blank content
    pub fn has_value(&self, key: ColumnKey) -> bool {
        !is_blank(self.cell(key))
    }

    /// Whether this row is a standard-error continuation line
    pub fn is_unnamed(&self) -> bool {
        is_blank(&self.variable)
    }
}

/// A named row with its standard errors already paired per column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficient {
    pub variable: String,
    pub values: [String; 3],
    pub standard_errors: [Option<String>; 3],
}

impl Coefficient {
    /// Coefficient text for a column (may be empty)
    pub fn value(&self, key: ColumnKey) -> &str {
        &self.values[key.index()]
    }

    /// Paired standard error for a column, if one followed the row
    pub fn standard_error(&self, key: ColumnKey) -> Option<&str> {
        self.standard_errors[key.index()].as_deref()
    }
}

/// Summary statistic recognized by the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    Observations,
    RSquared,
    AdjRSquared,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 3] = [
        SummaryKind::Observations,
        SummaryKind::RSquared,
        SummaryKind::AdjRSquared,
    ];

    /// Display label for the summary row
    pub fn label(self) -> &'static str {
        match self {
            SummaryKind::Observations => "Observations",
            SummaryKind::RSquared => "R²",
            SummaryKind::AdjRSquared => "Adjusted R²",
        }
    }

    /// Recognize a metric label as written by common regression exporters
    /// ("Observations", "Num. obs.", "R²", "R-squared", "Adj. R²", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .map(|c| if c == '²' { '2' } else { c })
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "observations" | "numobs" | "nobs" | "n" => Some(SummaryKind::Observations),
            "r2" | "rsquared" => Some(SummaryKind::RSquared),
            "adjr2" | "adjustedr2" | "adjrsquared" | "adjustedrsquared" => {
                Some(SummaryKind::AdjRSquared)
            }
            _ => None,
        }
    }
}

/// A summary metric row with its values indexed by column position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMetric {
    pub metric: String,
    pub values: [String; 3],
}

/// An ingested, immutable regression-result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    dependent_variable: String,
    rows: Vec<TableRow>,
    coefficients: Vec<Coefficient>,
    summary: Vec<SummaryMetric>,
    /// normalized variable name → index into `coefficients` (first occurrence)
    by_name: HashMap<String, usize>,
}

impl TableRecord {
    /// Ingest a raw exported table, pairing standard-error rows with their coefficient
    pub fn from_raw(raw: RawTable) -> Self {
        let rows: Vec<TableRow> = raw
            .data
            .into_iter()
            .map(|r| TableRow {
                variable: r.variable,
                cells: [r.col1, r.col2, r.col3],
            })
            .collect();

        let mut coefficients: Vec<Coefficient> = Vec::new();
        let mut by_name = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            if row.is_unnamed() {
                continue;
            }

            let mut standard_errors: [Option<String>; 3] = [None, None, None];
            for key in ColumnKey::ALL {
                standard_errors[key.index()] = rows[i + 1..]
                    .iter()
                    .take_while(|next| next.is_unnamed())
                    .map(|next| next.cell(key).trim())
                    .find(|cell| is_parenthesized(cell))
                    .map(str::to_string);
            }

            by_name
                .entry(crate::canonical::normalize_name(&row.variable))
                .or_insert(coefficients.len());
            coefficients.push(Coefficient {
                variable: row.variable.clone(),
                values: row.cells.clone(),
                standard_errors,
            });
        }

        let summary = raw
            .summary
            .into_iter()
            .map(|m| SummaryMetric {
                metric: m.metric,
                values: [m.value, m.value2, m.value3],
            })
            .collect();

        Self {
            dependent_variable: raw.dependent_variable,
            rows,
            coefficients,
            summary,
            by_name,
        }
    }

    /// Start building a table in code (fixtures, tests, benchmarks)
    pub fn builder(dependent_variable: impl Into<String>) -> TableBuilder {
        TableBuilder {
            raw: RawTable {
                dependent_variable: dependent_variable.into(),
                ..RawTable::default()
            },
        }
    }

    /// Free-text label of the regression outcome
    pub fn dependent_variable(&self) -> &str {
        &self.dependent_variable
    }

    /// All data rows in source order, standard-error rows included
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Named rows with paired standard errors, in source order
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Look up a named row by its normalized variable name
    pub fn coefficient(&self, normalized: &str) -> Option<&Coefficient> {
        self.by_name.get(normalized).map(|&i| &self.coefficients[i])
    }

    /// Summary metric rows in source order
    pub fn summary(&self) -> &[SummaryMetric] {
        &self.summary
    }

    /// First data row whose variable satisfies `pred`
    pub fn find_row<F>(&self, pred: F) -> Option<&TableRow>
    where
        F: Fn(&str) -> bool,
    {
        self.rows.iter().find(|r| pred(&r.variable))
    }

    /// Whether any row has non-blank content in the column
    pub fn has_column(&self, key: ColumnKey) -> bool {
        self.rows.iter().any(|r| r.has_value(key))
    }

    /// Raw summary text for a statistic in a column, if recorded and non-blank
    pub fn summary_value(&self, kind: SummaryKind, key: ColumnKey) -> Option<&str> {
        self.summary
            .iter()
            .find(|m| SummaryKind::from_label(&m.metric) == Some(kind))
            .map(|m| m.values[key.index()].trim())
            .filter(|v| !v.is_empty())
    }

    /// Observation count of a column, tolerating thousands separators and
    /// integral floats (`63413.0`) from numeric JSON cells
    pub fn observation_count(&self, key: ColumnKey) -> Option<u64> {
        let text = self.summary_value(SummaryKind::Observations, key)?;
        let digits: String = text
            .chars()
            .filter(|c| !matches!(*c, ',' | '_' | ' '))
            .collect();
        if let Ok(count) = digits.parse::<u64>() {
            return Some(count);
        }

        let value: f64 = digits.parse().ok()?;
        let integral = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
        (integral && value <= u64::MAX as f64).then_some(value as u64)
    }
}

/// Incremental construction of a [`TableRecord`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    raw: RawTable,
}

impl TableBuilder {
    /// Append a named coefficient row
    pub fn row(mut self, variable: &str, cells: [&str; 3]) -> Self {
        self.raw.data.push(RawRow {
            variable: variable.to_string(),
            col1: cells[0].to_string(),
            col2: cells[1].to_string(),
            col3: cells[2].to_string(),
        });
        self
    }

    /// Append an unnamed standard-error row
    pub fn se_row(self, cells: [&str; 3]) -> Self {
        self.row("", cells)
    }

    /// Append a summary metric row
    pub fn metric(mut self, metric: &str, values: [&str; 3]) -> Self {
        self.raw.summary.push(RawMetric {
            metric: metric.to_string(),
            value: values[0].to_string(),
            value2: values[1].to_string(),
            value3: values[2].to_string(),
        });
        self
    }

    pub fn build(self) -> TableRecord {
        TableRecord::from_raw(self.raw)
    }
}

/// Parse a JSON array of exported tables
pub fn parse_tables(json: &str) -> Result<Vec<TableRecord>> {
    let raw: Vec<RawTable> = serde_json::from_str(json).context("Invalid table JSON")?;
    Ok(raw.into_iter().map(TableRecord::from_raw).collect())
}

/// Load a JSON array of exported tables from disk
pub fn load_tables<P: AsRef<Path>>(path: P) -> Result<Vec<TableRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tables file: {}", path.display()))?;
    parse_tables(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn is_parenthesized(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('(') && text.ends_with(')')
}
