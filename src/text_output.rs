//! Plain-text rendering of a comparison matrix for terminals
//!
//! Column labels are long, so the grid numbers its columns and lists the
//! labels as a legend above it.

use crate::matrix::ComparisonMatrix;

/// Render the matrix as an aligned text table
pub fn render(matrix: &ComparisonMatrix, include_standard_errors: bool) -> String {
    if matrix.header.is_empty() {
        return "No columns matched the request.\n".to_string();
    }

    let mut output = String::new();
    for (i, header) in matrix.header.iter().enumerate() {
        let marker = match (header.has_source, header.bound) {
            (_, true) => "",
            (true, false) => "  (no matching column)",
            (false, false) => "  (no matching table)",
        };
        output.push_str(&format!("[{}] {}{}\n", i + 1, header.label, marker));
    }
    output.push('\n');

    // Grid of text lines: header, variables (+ SE lines), summary
    let mut lines: Vec<(String, Vec<String>)> = Vec::new();
    lines.push((
        "variable".to_string(),
        (1..=matrix.width()).map(|i| format!("[{}]", i)).collect(),
    ));
    let divider_at = lines.len();

    for row in &matrix.rows {
        lines.push((
            row.variable.clone(),
            row.cells.iter().map(|c| c.coefficient.clone()).collect(),
        ));
        if include_standard_errors && row.cells.iter().any(|c| c.standard_error.is_some()) {
            lines.push((
                String::new(),
                row.cells
                    .iter()
                    .map(|c| c.standard_error.clone().unwrap_or_default())
                    .collect(),
            ));
        }
    }
    let summary_at = lines.len();

    for summary in &matrix.summary_rows {
        lines.push((
            summary.metric.clone(),
            summary
                .values
                .iter()
                .map(|v| v.clone().unwrap_or_default())
                .collect(),
        ));
    }

    let name_width = lines.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
    let cell_widths: Vec<usize> = (0..matrix.width())
        .map(|col| {
            lines
                .iter()
                .filter_map(|(_, cells)| cells.get(col))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = {
        let mut rule = "-".repeat(name_width);
        for width in &cell_widths {
            rule.push(' ');
            rule.push_str(&"-".repeat(*width));
        }
        rule
    };

    for (i, (name, cells)) in lines.iter().enumerate() {
        if i == divider_at || i == summary_at {
            output.push_str(&rule);
            output.push('\n');
        }
        let mut line = format!("{:<width$}", name, width = name_width);
        for (cell, width) in cells.iter().zip(&cell_widths) {
            line.push_str(&format!(" {:>width$}", cell, width = *width));
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}
