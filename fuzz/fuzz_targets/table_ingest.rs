#![no_main]

use libfuzzer_sys::fuzz_target;
use regmatrix::catalog::Catalog;
use regmatrix::category::{ControlType, DependentCategory, Sample, Stage, UiMeasure};
use regmatrix::config::PresentationConfig;
use regmatrix::filter::FilterRequest;
use regmatrix::{matrix, select, table};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Malformed JSON is an error; anything that parses must classify and assemble without panicking
    let Ok(tables) = table::parse_tables(input) else {
        return;
    };

    let catalog = Catalog::build(tables);
    let config = PresentationConfig::default();

    let baseline = FilterRequest::baseline()
        .with_deps(DependentCategory::SELECTABLE)
        .with_ui(UiMeasure::PRIORITY)
        .with_controls(ControlType::ALL);
    let iv = FilterRequest::iv()
        .with_stages([Stage::First, Stage::Second])
        .with_samples([Sample::Whole, Sample::LotteryScp, Sample::LotteryOnly]);

    for filter in [baseline, iv] {
        let columns = select::select(&filter, catalog.records(), &config);
        let _ = matrix::assemble(&columns, &config.variable_order(), filter.is_iv());
    }
});
