//! Catalog of classified tables
//!
//! Tables are classified once when the catalog is built; the indexed records
//! are then shared read-only by every selection. The catalog also keeps the
//! diagnostics classification cannot express as a category: tables whose
//! outcome no filter can reach, and columns with an anomalous age-control
//! combination.

use crate::classify::{classify, AgePresence, IndexedRecord};
use crate::table::{ColumnKey, TableRecord};
use std::sync::Arc;
use tracing::{info, warn};

/// A column whose age regressors match no known control configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlAnomaly {
    /// Position of the table in the loaded sequence
    pub table_index: usize,
    pub dependent_variable: String,
    pub column: ColumnKey,
    pub presence: AgePresence,
}

/// Indexed records for a loaded table set
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<IndexedRecord>,
    anomalies: Vec<ControlAnomaly>,
}

impl Catalog {
    /// Classify every table, preserving load order
    pub fn build(tables: Vec<TableRecord>) -> Self {
        Self::from_shared(tables.into_iter().map(Arc::new).collect())
    }

    /// Classify tables that are already shared elsewhere
    pub fn from_shared(tables: Vec<Arc<TableRecord>>) -> Self {
        let mut anomalies = Vec::new();
        let mut records = Vec::with_capacity(tables.len());

        for (table_index, table) in tables.into_iter().enumerate() {
            let record = classify(table);

            for (&column, &presence) in &record.column_presence {
                if presence.control_type().is_none() {
                    anomalies.push(ControlAnomaly {
                        table_index,
                        dependent_variable: record.table.dependent_variable().to_string(),
                        column,
                        presence,
                    });
                }
            }

            if record.is_unreachable() {
                warn!(
                    table_index,
                    dependent = record.table.dependent_variable(),
                    "dependent variable not recognized; table cannot be selected by any filter"
                );
            }

            records.push(record);
        }

        info!(
            tables = records.len(),
            unreachable = records.iter().filter(|r| r.is_unreachable()).count(),
            anomalies = anomalies.len(),
            "catalog built"
        );

        Self { records, anomalies }
    }

    /// All indexed records in load order
    pub fn records(&self) -> &[IndexedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records no filter can select, with their load index
    ///
    /// Only baseline tables with an unrecognized dependent variable qualify;
    /// the instrumented path walks every `iv` table regardless of outcome.
    pub fn unreachable(&self) -> impl Iterator<Item = (usize, &IndexedRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_unreachable())
    }

    /// Columns whose control configuration was defaulted to `include`
    pub fn anomalies(&self) -> &[ControlAnomaly] {
        &self.anomalies
    }
}
