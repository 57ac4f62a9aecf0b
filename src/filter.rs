//! Filter requests: which columns the comparison matrix should show
//!
//! A request is an immutable value built once per render. Empty sets are
//! legal; they simply select nothing on that axis.

use crate::category::{ControlType, DependentCategory, Sample, Specification, Stage, UiMeasure};
use std::collections::BTreeSet;

/// Requested specification and category sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub spec: Specification,
    pub deps: BTreeSet<DependentCategory>,
    pub ui: BTreeSet<UiMeasure>,
    pub controls: BTreeSet<ControlType>,
    /// Instrumented requests only
    pub stages: BTreeSet<Stage>,
    /// Instrumented requests only
    pub samples: BTreeSet<Sample>,
}

impl FilterRequest {
    /// Empty request for a specification
    pub fn new(spec: Specification) -> Self {
        Self {
            spec,
            deps: BTreeSet::new(),
            ui: BTreeSet::new(),
            controls: BTreeSet::new(),
            stages: BTreeSet::new(),
            samples: BTreeSet::new(),
        }
    }

    /// Empty baseline request
    pub fn baseline() -> Self {
        Self::new(Specification::Baseline)
    }

    /// Empty instrumented request
    pub fn iv() -> Self {
        Self::new(Specification::Iv)
    }

    pub fn with_deps(mut self, deps: impl IntoIterator<Item = DependentCategory>) -> Self {
        self.deps.extend(deps);
        self
    }

    pub fn with_ui(mut self, ui: impl IntoIterator<Item = UiMeasure>) -> Self {
        self.ui.extend(ui);
        self
    }

    pub fn with_controls(mut self, controls: impl IntoIterator<Item = ControlType>) -> Self {
        self.controls.extend(controls);
        self
    }

    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages.extend(stages);
        self
    }

    pub fn with_samples(mut self, samples: impl IntoIterator<Item = Sample>) -> Self {
        self.samples.extend(samples);
        self
    }

    pub fn is_iv(&self) -> bool {
        self.spec == Specification::Iv
    }

    /// Requested dependent categories in canonical column order
    pub fn ordered_deps(&self) -> impl Iterator<Item = DependentCategory> + '_ {
        DependentCategory::SELECTABLE
            .into_iter()
            .filter(|d| self.deps.contains(d))
    }

    /// UI choices for a dependent category: `None` means "no UI constraint"
    ///
    /// The first-stage wealth outcome ignores UI measures, and an empty UI
    /// set leaves the UI axis unconstrained.
    pub fn ui_choices(&self, dep: DependentCategory) -> Vec<Option<UiMeasure>> {
        if dep == DependentCategory::Wealth || self.ui.is_empty() {
            return vec![None];
        }
        UiMeasure::PRIORITY
            .into_iter()
            .filter(|u| self.ui.contains(u))
            .map(Some)
            .collect()
    }

    /// Requested control categories in canonical column order
    pub fn ordered_controls(&self) -> impl Iterator<Item = ControlType> + '_ {
        ControlType::ALL
            .into_iter()
            .filter(|c| self.controls.contains(c))
    }

    /// Whether an instrumented column's stage and sample are both requested
    pub fn accepts_stage_sample(&self, stage: Stage, sample: Sample) -> bool {
        self.stages.contains(&stage) && self.samples.contains(&sample)
    }
}
