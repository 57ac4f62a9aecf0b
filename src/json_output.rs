//! JSON output format for comparison matrices
//!
//! `--format json`: a versioned envelope around the assembled matrix plus the
//! request that produced it and, when asked for, catalog diagnostics.

use crate::catalog::Catalog;
use crate::category::{ControlType, DependentCategory, Sample, Specification, Stage, UiMeasure};
use crate::filter::FilterRequest;
use crate::matrix::ComparisonMatrix;
use serde::Serialize;

/// Echo of the filter request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRequest {
    pub spec: Specification,
    pub deps: Vec<DependentCategory>,
    pub ui: Vec<UiMeasure>,
    pub controls: Vec<ControlType>,
    /// Only meaningful for instrumented requests
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Sample>,
}

impl From<&FilterRequest> for JsonRequest {
    fn from(filter: &FilterRequest) -> Self {
        let iv = filter.is_iv();
        Self {
            spec: filter.spec,
            deps: filter.deps.iter().copied().collect(),
            ui: filter.ui.iter().copied().collect(),
            controls: filter.controls.iter().copied().collect(),
            stages: if iv { filter.stages.iter().copied().collect() } else { Vec::new() },
            samples: if iv { filter.samples.iter().copied().collect() } else { Vec::new() },
        }
    }
}

/// A table no filter category can reach
#[derive(Debug, Clone, Serialize)]
pub struct JsonUnreachable {
    pub table_index: usize,
    pub dependent_variable: String,
}

/// A column whose control configuration was defaulted
#[derive(Debug, Clone, Serialize)]
pub struct JsonAnomaly {
    pub table_index: usize,
    pub dependent_variable: String,
    pub column: String,
    pub age: bool,
    pub age2: bool,
    pub age_sex: bool,
}

/// Catalog diagnostics (if --diagnostics enabled)
#[derive(Debug, Clone, Serialize)]
pub struct JsonDiagnostics {
    pub tables: usize,
    pub unreachable: Vec<JsonUnreachable>,
    pub anomalies: Vec<JsonAnomaly>,
}

impl From<&Catalog> for JsonDiagnostics {
    fn from(catalog: &Catalog) -> Self {
        Self {
            tables: catalog.len(),
            unreachable: catalog
                .unreachable()
                .map(|(table_index, r)| JsonUnreachable {
                    table_index,
                    dependent_variable: r.table.dependent_variable().to_string(),
                })
                .collect(),
            anomalies: catalog
                .anomalies()
                .iter()
                .map(|a| JsonAnomaly {
                    table_index: a.table_index,
                    dependent_variable: a.dependent_variable.clone(),
                    column: a.column.label().to_string(),
                    age: a.presence.age,
                    age2: a.presence.age2,
                    age_sex: a.presence.age_sex,
                })
                .collect(),
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'m> {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub request: JsonRequest,
    pub matrix: &'m ComparisonMatrix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<JsonDiagnostics>,
}

impl<'m> JsonOutput<'m> {
    pub fn new(filter: &FilterRequest, matrix: &'m ComparisonMatrix) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "regmatrix-json-v1".to_string(),
            request: JsonRequest::from(filter),
            matrix,
            diagnostics: None,
        }
    }

    /// Attach catalog diagnostics
    pub fn set_diagnostics(&mut self, catalog: &Catalog) {
        self.diagnostics = Some(JsonDiagnostics::from(catalog));
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
