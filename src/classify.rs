//! Heuristic classification of regression tables
//!
//! Tables carry no metadata beyond variable names and cell text, so every
//! category is inferred from content. All functions here are total: unknown
//! shapes resolve to `other`, `none` or `include` instead of failing.

use crate::canonical::normalize_name;
use crate::category::{ControlType, DependentCategory, Specification, UiMeasure};
use crate::table::{ColumnKey, TableRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dependent-variable substrings, tested in order (log variants before their prefixes)
const DEPENDENT_PATTERNS: [(&str, DependentCategory); 5] = [
    ("wealth_at_end", DependentCategory::Wealth),
    ("6_months_log", DependentCategory::SixMonthsLog),
    ("6_months", DependentCategory::SixMonths),
    ("3_months_log", DependentCategory::ThreeMonthsLog),
    ("3_months", DependentCategory::ThreeMonths),
];

/// Regressor that marks the second stage of an instrumented design
pub const FITTED_WEALTH: &str = "wealth_at_end(fit)";

/// A table together with its inferred categories
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub spec: Specification,
    pub dep: DependentCategory,
    pub ui: UiMeasure,
    /// Control configuration of every present column, in column order
    pub column_meta: BTreeMap<ColumnKey, ControlType>,
    /// Age regressors seen in every present column
    pub column_presence: BTreeMap<ColumnKey, AgePresence>,
    pub table: Arc<TableRecord>,
}

impl IndexedRecord {
    /// Present columns in order
    pub fn columns(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.column_meta.keys().copied()
    }

    /// First present column with the given control configuration
    pub fn column_with(&self, control: ControlType) -> Option<ColumnKey> {
        self.column_meta
            .iter()
            .find(|&(_, &c)| c == control)
            .map(|(&key, _)| key)
    }

    /// Age regressors found in a present column
    pub fn presence(&self, key: ColumnKey) -> Option<AgePresence> {
        self.column_presence.get(&key).copied()
    }

    /// No filter can reach a baseline table with an unrecognized outcome.
    /// Instrumented tables are selected whatever their outcome label.
    pub fn is_unreachable(&self) -> bool {
        self.dep == DependentCategory::Other && self.spec == Specification::Baseline
    }
}

/// Classify a table once; the record shares the table read-only
pub fn classify(table: Arc<TableRecord>) -> IndexedRecord {
    let dep = classify_dependent(table.dependent_variable());
    let spec = classify_spec(&table);
    let ui = detect_ui_size(&table);
    let mut column_meta = BTreeMap::new();
    let mut column_presence = BTreeMap::new();
    for key in columns_in_table(&table) {
        let presence = AgePresence::scan(&table, key);
        column_meta.insert(key, resolve_control(&table, key, presence));
        column_presence.insert(key, presence);
    }

    debug!(
        dependent = table.dependent_variable(),
        %dep,
        %spec,
        %ui,
        "classified table"
    );

    IndexedRecord {
        spec,
        dep,
        ui,
        column_meta,
        column_presence,
        table,
    }
}

/// Dependent-variable category from the outcome label
pub fn classify_dependent(name: &str) -> DependentCategory {
    let lower = name.to_lowercase();
    DEPENDENT_PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map_or(DependentCategory::Other, |&(_, category)| category)
}

/// Baseline vs. instrumented: wealth outcome (first stage) or fitted wealth regressor (second stage)
pub fn classify_spec(table: &TableRecord) -> Specification {
    if classify_dependent(table.dependent_variable()) == DependentCategory::Wealth {
        return Specification::Iv;
    }

    let second_stage = table
        .rows()
        .iter()
        .any(|r| r.variable.trim().eq_ignore_ascii_case(FITTED_WEALTH));

    if second_stage {
        Specification::Iv
    } else {
        Specification::Baseline
    }
}

/// The UI-size measure a table varies; first present in priority order wins
pub fn detect_ui_size(table: &TableRecord) -> UiMeasure {
    UiMeasure::PRIORITY
        .into_iter()
        .find(|measure| {
            measure.variable_name().is_some_and(|name| {
                table.rows().iter().any(|r| {
                    normalize_name(&r.variable) == name
                        && ColumnKey::ALL.into_iter().any(|key| r.has_value(key))
                })
            })
        })
        .unwrap_or(UiMeasure::Absent)
}

/// Columns holding any non-blank content, each decided independently
pub fn columns_in_table(table: &TableRecord) -> Vec<ColumnKey> {
    ColumnKey::ALL
        .into_iter()
        .filter(|&key| table.has_column(key))
        .collect()
}

/// Which age regressors carry a value in one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgePresence {
    pub age: bool,
    pub age2: bool,
    pub age_sex: bool,
}

impl AgePresence {
    /// Scan a column for `Age` (exact), `Age2` and `Age:sex2` (case-insensitive)
    pub fn scan(table: &TableRecord, key: ColumnKey) -> Self {
        Self {
            age: column_has(table, key, |name| name == "Age"),
            age2: column_has(table, key, |name| name.eq_ignore_ascii_case("age2")),
            age_sex: column_has(table, key, |name| name.eq_ignore_ascii_case("age:sex2")),
        }
    }

    /// Control configuration for a recognized combination; `None` for shapes
    /// the exported models never produce (e.g. `Age2` without `Age`)
    pub fn control_type(self) -> Option<ControlType> {
        match (self.age, self.age2, self.age_sex) {
            (false, false, false) => Some(ControlType::Exclude),
            (true, false, false) => Some(ControlType::Include),
            (true, false, true) => Some(ControlType::Interaction),
            (true, true, false) => Some(ControlType::Age2Control),
            (true, true, true) => Some(ControlType::Age2Interaction),
            (false, _, _) => None,
        }
    }
}

fn column_has(table: &TableRecord, key: ColumnKey, matches: impl Fn(&str) -> bool) -> bool {
    table
        .rows()
        .iter()
        .any(|r| matches(r.variable.trim()) && r.has_value(key))
}

/// Control configuration of a column; anomalous combinations fall back to `include`
pub fn column_control_type(table: &TableRecord, key: ColumnKey) -> ControlType {
    resolve_control(table, key, AgePresence::scan(table, key))
}

fn resolve_control(table: &TableRecord, key: ColumnKey, presence: AgePresence) -> ControlType {
    presence.control_type().unwrap_or_else(|| {
        warn!(
            dependent = table.dependent_variable(),
            column = %key,
            age2 = presence.age2,
            age_sex = presence.age_sex,
            "age regressors present without Age; treating column as 'include'"
        );
        ControlType::Include
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_rows(dep: &str, rows: &[(&str, [&str; 3])]) -> TableRecord {
        rows.iter()
            .fold(TableRecord::builder(dep), |b, (name, cells)| {
                b.row(name, *cells)
            })
            .build()
    }

    #[test]
    fn test_classify_dependent_all_categories() {
        assert_eq!(
            classify_dependent("wealth_at_end"),
            DependentCategory::Wealth
        );
        assert_eq!(
            classify_dependent("Change_6_months_log"),
            DependentCategory::SixMonthsLog
        );
        assert_eq!(
            classify_dependent("change_6_months"),
            DependentCategory::SixMonths
        );
        assert_eq!(
            classify_dependent("3_MONTHS_LOG_change"),
            DependentCategory::ThreeMonthsLog
        );
        assert_eq!(
            classify_dependent("3_months_change"),
            DependentCategory::ThreeMonths
        );
        assert_eq!(classify_dependent("income"), DependentCategory::Other);
        assert_eq!(classify_dependent(""), DependentCategory::Other);
    }

    #[test]
    fn test_classify_dependent_log_before_prefix() {
        // "3_months" is a prefix of "3_months_log"
        assert_eq!(
            classify_dependent("x_3_months_log"),
            DependentCategory::ThreeMonthsLog
        );
        // wealth wins over any horizon
        assert_eq!(
            classify_dependent("wealth_at_end_6_months"),
            DependentCategory::Wealth
        );
    }

    #[test]
    fn test_classify_spec_wealth_is_first_stage() {
        let t = table_with_rows("wealth_at_end", &[("amount_scp", ["1", "", ""])]);
        assert_eq!(classify_spec(&t), Specification::Iv);
    }

    #[test]
    fn test_classify_spec_fitted_wealth_is_second_stage() {
        let t = table_with_rows(
            "3_months_change",
            &[("Wealth_At_End(fit)", ["0.2", "", ""])],
        );
        assert_eq!(classify_spec(&t), Specification::Iv);
    }

    #[test]
    fn test_classify_spec_baseline() {
        let t = table_with_rows("3_months_change", &[("Age", ["0.01", "", ""])]);
        assert_eq!(classify_spec(&t), Specification::Baseline);
    }

    #[test]
    fn test_detect_ui_size_priority() {
        let t = table_with_rows(
            "3_months",
            &[
                ("median_ui", ["0.1", "", ""]),
                ("avg_ui_log", ["", "0.2", ""]),
            ],
        );
        assert_eq!(detect_ui_size(&t), UiMeasure::AvgUiLog);
    }

    #[test]
    fn test_detect_ui_size_requires_value() {
        let t = table_with_rows(
            "3_months",
            &[("avg_ui_linear", ["", "", ""]), ("MEDIAN_UI_LOG", ["", "", "1"])],
        );
        assert_eq!(detect_ui_size(&t), UiMeasure::MedianUiLog);
    }

    #[test]
    fn test_detect_ui_size_none() {
        let t = table_with_rows("3_months", &[("Age", ["0.1", "", ""])]);
        assert_eq!(detect_ui_size(&t), UiMeasure::Absent);
    }

    #[test]
    fn test_columns_in_table_independent() {
        let t = table_with_rows(
            "3_months",
            &[("Age", ["0.1", "", ""]), ("", ["", "", "(0.2)"])],
        );
        assert_eq!(columns_in_table(&t), vec![ColumnKey::One, ColumnKey::Three]);
    }

    #[test]
    fn test_control_type_exhaustive() {
        let cases = [
            ((false, false, false), ControlType::Exclude),
            ((true, false, false), ControlType::Include),
            ((true, false, true), ControlType::Interaction),
            ((true, true, false), ControlType::Age2Control),
            ((true, true, true), ControlType::Age2Interaction),
            ((false, true, false), ControlType::Include),
            ((false, false, true), ControlType::Include),
            ((false, true, true), ControlType::Include),
        ];

        for ((age, age2, age_sex), expected) in cases {
            let mut rows = Vec::new();
            if age {
                rows.push(("Age", ["0.1", "", ""]));
            }
            if age2 {
                rows.push(("AGE2", ["0.2", "", ""]));
            }
            if age_sex {
                rows.push(("age:Sex2", ["0.3", "", ""]));
            }
            rows.push(("married", ["0.4", "", ""]));
            let t = table_with_rows("3_months", &rows);

            assert_eq!(
                column_control_type(&t, ColumnKey::One),
                expected,
                "age={} age2={} age_sex={}",
                age,
                age2,
                age_sex
            );
        }
    }

    #[test]
    fn test_anomalous_presence_has_no_category() {
        let presence = AgePresence {
            age: false,
            age2: true,
            age_sex: false,
        };
        assert_eq!(presence.control_type(), None);
    }

    #[test]
    fn test_bare_age_is_case_sensitive() {
        let t = table_with_rows("3_months", &[("age", ["0.1", "", ""])]);
        assert!(!AgePresence::scan(&t, ColumnKey::One).age);
        assert_eq!(column_control_type(&t, ColumnKey::One), ControlType::Exclude);
    }

    #[test]
    fn test_control_type_per_column() {
        let t = table_with_rows(
            "3_months",
            &[
                ("Age", ["", "0.1", "0.1"]),
                ("Age2", ["", "", "0.2"]),
                ("married", ["1", "1", "1"]),
            ],
        );
        let record = classify(Arc::new(t));
        assert_eq!(record.column_meta[&ColumnKey::One], ControlType::Exclude);
        assert_eq!(record.column_meta[&ColumnKey::Two], ControlType::Include);
        assert_eq!(record.column_meta[&ColumnKey::Three], ControlType::Age2Control);
        assert_eq!(record.column_with(ControlType::Include), Some(ColumnKey::Two));
        assert_eq!(record.column_with(ControlType::Interaction), None);
    }

    #[test]
    fn test_record_keeps_column_presence() {
        let t = table_with_rows(
            "3_months",
            &[
                ("Age", ["0.1", "", "0.1"]),
                ("Age2", ["", "0.2", "0.2"]),
                ("Age:sex2", ["", "", "0.3"]),
            ],
        );
        let record = classify(Arc::new(t));

        assert_eq!(
            record.presence(ColumnKey::One),
            Some(AgePresence { age: true, age2: false, age_sex: false })
        );
        let anomalous = record.presence(ColumnKey::Two).unwrap();
        assert_eq!(anomalous.control_type(), None);
        assert_eq!(record.column_meta[&ColumnKey::Two], ControlType::Include);
        assert_eq!(
            record.presence(ColumnKey::Three).and_then(AgePresence::control_type),
            Some(ControlType::Age2Interaction)
        );
        assert_eq!(record.column_presence.len(), record.column_meta.len());
    }

    #[test]
    fn test_unreachable_only_for_baseline_other() {
        let baseline = classify(Arc::new(table_with_rows(
            "income_change",
            &[("Age", ["0.1", "", ""])],
        )));
        assert!(baseline.is_unreachable());

        let second_stage = classify(Arc::new(table_with_rows(
            "consumption_change",
            &[("wealth_at_end(fit)", ["0.2", "", ""])],
        )));
        assert_eq!(second_stage.dep, DependentCategory::Other);
        assert_eq!(second_stage.spec, Specification::Iv);
        assert!(!second_stage.is_unreachable());

        let known = classify(Arc::new(table_with_rows(
            "3_months_change",
            &[("Age", ["0.1", "", ""])],
        )));
        assert!(!known.is_unreachable());
    }

    #[test]
    fn test_classify_record() {
        let t = table_with_rows(
            "6_months_log_change",
            &[
                ("avg_ui_linear", ["0.5*", "0.4", ""]),
                ("Age", ["0.01", "", ""]),
            ],
        );
        let record = classify(Arc::new(t));
        assert_eq!(record.dep, DependentCategory::SixMonthsLog);
        assert_eq!(record.spec, Specification::Baseline);
        assert_eq!(record.ui, UiMeasure::AvgUiLinear);
        assert_eq!(
            record.columns().collect::<Vec<_>>(),
            vec![ColumnKey::One, ColumnKey::Two]
        );
    }
}
