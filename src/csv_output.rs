//! CSV output format for comparison matrices
//!
//! Laid out like the exported regression tables: one row per variable, an
//! unnamed row of standard errors beneath it, and the summary metrics last.

use crate::matrix::{ComparisonMatrix, MatrixRow};

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput<'m> {
    matrix: &'m ComparisonMatrix,
    include_standard_errors: bool,
}

impl<'m> CsvOutput<'m> {
    pub fn new(matrix: &'m ComparisonMatrix, include_standard_errors: bool) -> Self {
        Self {
            matrix,
            include_standard_errors,
        }
    }

    /// Header row: the variable column followed by one label per matrix column
    fn header(&self) -> String {
        std::iter::once("variable".to_string())
            .chain(self.matrix.header.iter().map(|h| Self::escape_field(&h.label)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(&self, row: &MatrixRow) -> String {
        let mut line = Self::escape_field(&row.variable);
        for cell in &row.cells {
            line.push(',');
            line.push_str(&Self::escape_field(&cell.coefficient));
        }
        line
    }

    /// Unnamed standard-error row, or `None` when no cell has one
    fn format_standard_errors(&self, row: &MatrixRow) -> Option<String> {
        if row.cells.iter().all(|c| c.standard_error.is_none()) {
            return None;
        }
        let mut line = String::new();
        for cell in &row.cells {
            line.push(',');
            if let Some(ref se) = cell.standard_error {
                line.push_str(&Self::escape_field(se));
            }
        }
        Some(line)
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.matrix.rows {
            output.push_str(&self.format_row(row));
            output.push('\n');

            if self.include_standard_errors {
                if let Some(line) = self.format_standard_errors(row) {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
        }

        for summary in &self.matrix.summary_rows {
            output.push_str(&Self::escape_field(&summary.metric));
            for value in &summary.values {
                output.push(',');
                if let Some(value) = value {
                    output.push_str(&Self::escape_field(value));
                }
            }
            output.push('\n');
        }

        output
    }
}
