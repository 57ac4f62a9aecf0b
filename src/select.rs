//! Column selection for a filter request
//!
//! Baseline requests expand to the full product of requested categories, one
//! column per combination whether or not a table matches. Instrumented
//! requests emit a column only for each actual (table, column) pair whose
//! stage and observation-count sample were requested.

use crate::category::{
    ControlType, DependentCategory, Sample, Specification, Stage, UiMeasure,
};
use crate::classify::IndexedRecord;
use crate::config::PresentationConfig;
use crate::filter::FilterRequest;
use crate::table::{ColumnKey, SummaryKind, TableRecord};
use tracing::{debug, trace};

/// One column of the comparison matrix
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub dep: DependentCategory,
    pub ui: Option<UiMeasure>,
    pub control: Option<ControlType>,
    pub stage: Option<Stage>,
    pub sample: Option<Sample>,
    /// Table the column was drawn from, if any candidate matched
    pub source: Option<&'a IndexedRecord>,
    /// Column within the source; `None` leaves every cell blank
    pub source_column: Option<ColumnKey>,
    pub observations: Option<String>,
    pub r_squared: Option<String>,
    pub adj_r_squared: Option<String>,
}

impl<'a> Column<'a> {
    fn new(dep: DependentCategory) -> Self {
        Self {
            dep,
            ui: None,
            control: None,
            stage: None,
            sample: None,
            source: None,
            source_column: None,
            observations: None,
            r_squared: None,
            adj_r_squared: None,
        }
    }

    /// Attach a source record and, when resolved, its column and summary values
    fn bind(mut self, record: &'a IndexedRecord, key: Option<ColumnKey>) -> Self {
        self.source = Some(record);
        self.source_column = key;
        if let Some(key) = key {
            let table = &record.table;
            let value = |kind| table.summary_value(kind, key).map(str::to_string);
            self.observations = value(SummaryKind::Observations);
            self.r_squared = value(SummaryKind::RSquared);
            self.adj_r_squared = value(SummaryKind::AdjRSquared);
        }
        self
    }

    /// Source table and column when both are resolved
    pub fn binding(&self) -> Option<(&'a TableRecord, ColumnKey)> {
        match (self.source, self.source_column) {
            (Some(record), Some(key)) => Some((record.table.as_ref(), key)),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    /// Summary value for one of the fixed summary rows
    pub fn summary(&self, kind: SummaryKind) -> Option<&str> {
        match kind {
            SummaryKind::Observations => self.observations.as_deref(),
            SummaryKind::RSquared => self.r_squared.as_deref(),
            SummaryKind::AdjRSquared => self.adj_r_squared.as_deref(),
        }
    }

    /// Header text describing what the column shows
    pub fn label(&self) -> String {
        let mut parts = Vec::new();
        if let Some(stage) = self.stage {
            parts.push(format!("{} stage", stage));
        }
        if let Some(sample) = self.sample {
            parts.push(sample.label().to_string());
        }
        parts.push(self.dep.title().to_string());
        if let Some(ui) = self.ui.filter(|u| *u != UiMeasure::Absent) {
            parts.push(ui.label().to_string());
        }
        if let Some(control) = self.control {
            parts.push(format!("age: {}", control));
        }
        if let (Some(_), Some(key)) = (self.stage, self.source_column) {
            parts.push(key.label().to_string());
        }
        parts.join(" | ")
    }
}

/// Select matrix columns for a request over classified records
pub fn select<'a>(
    filter: &FilterRequest,
    records: &'a [IndexedRecord],
    config: &PresentationConfig,
) -> Vec<Column<'a>> {
    let columns = match filter.spec {
        Specification::Baseline => select_baseline(filter, records),
        Specification::Iv => select_instrumented(filter, records, config),
    };
    debug!(
        spec = %filter.spec,
        columns = columns.len(),
        bound = columns.iter().filter(|c| c.is_bound()).count(),
        "selected columns"
    );
    columns
}

/// Baseline path: one column per (dep, ui, control) combination
pub fn select_baseline<'a>(filter: &FilterRequest, records: &'a [IndexedRecord]) -> Vec<Column<'a>> {
    let mut columns = Vec::new();

    for dep in filter.ordered_deps() {
        for ui in filter.ui_choices(dep) {
            let candidates: Vec<&IndexedRecord> = records
                .iter()
                .filter(|r| r.spec == Specification::Baseline && r.dep == dep)
                .filter(|r| ui.map_or(true, |u| r.ui == u))
                .collect();

            for control in filter.ordered_controls() {
                let mut column = Column::new(dep);
                column.ui = ui;
                column.control = Some(control);

                let exact = candidates
                    .iter()
                    .find_map(|r| r.column_with(control).map(|key| (*r, key)));

                column = match (exact, candidates.first()) {
                    (Some((record, key)), _) => column.bind(record, Some(key)),
                    (None, Some(&first)) => {
                        trace!(%dep, %control, "no column with requested control; leaving blank");
                        column.bind(first, None)
                    }
                    (None, None) => column,
                };
                columns.push(column);
            }
        }
    }

    columns
}

/// Instrumented path: every (iv table, present column) whose stage and sample were requested
pub fn select_instrumented<'a>(
    filter: &FilterRequest,
    records: &'a [IndexedRecord],
    config: &PresentationConfig,
) -> Vec<Column<'a>> {
    let mut columns = Vec::new();

    for record in records.iter().filter(|r| r.spec == Specification::Iv) {
        let stage = if record.dep == DependentCategory::Wealth {
            Stage::First
        } else {
            Stage::Second
        };

        for key in record.columns() {
            let observations = record.table.observation_count(key);
            let sample = config.sample_for(observations);
            if !filter.accepts_stage_sample(stage, sample) {
                trace!(%stage, %sample, column = %key, "instrumented column not requested");
                continue;
            }

            let mut column = Column::new(record.dep);
            column.ui = Some(record.ui).filter(|u| *u != UiMeasure::Absent);
            column.control = record.column_meta.get(&key).copied();
            column.stage = Some(stage);
            column.sample = Some(sample);
            columns.push(column.bind(record, Some(key)));
        }
    }

    columns
}
