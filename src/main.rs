use anyhow::{bail, Context, Result};
use clap::Parser;
use regmatrix::catalog::Catalog;
use regmatrix::cli::{Cli, OutputFormat};
use regmatrix::config::PresentationConfig;
use regmatrix::csv_output::CsvOutput;
use regmatrix::json_output::JsonOutput;
use regmatrix::{matrix, select, table, text_output};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings always reach stderr, --debug adds everything
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print catalog diagnostics for the text and CSV formats
fn print_diagnostics(catalog: &Catalog) {
    eprintln!("=== Catalog Diagnostics ===");
    eprintln!("Tables loaded: {}", catalog.len());

    let unreachable: Vec<_> = catalog.unreachable().collect();
    if unreachable.is_empty() {
        eprintln!("Unreachable tables: none");
    } else {
        eprintln!("Unreachable tables (unrecognized dependent variable):");
        for (index, record) in unreachable {
            eprintln!("  #{} {}", index, record.table.dependent_variable());
        }
    }

    if catalog.anomalies().is_empty() {
        eprintln!("Anomalous control columns: none");
    } else {
        eprintln!("Anomalous control columns (treated as 'include'):");
        for anomaly in catalog.anomalies() {
            eprintln!(
                "  #{} {} {}: Age={} Age2={} Age:sex2={}",
                anomaly.table_index,
                anomaly.dependent_variable,
                anomaly.column,
                anomaly.presence.age,
                anomaly.presence.age2,
                anomaly.presence.age_sex
            );
        }
    }
    eprintln!();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => PresentationConfig::from_toml(path)
            .with_context(|| format!("Failed to load presentation config {}", path.display()))?,
        None => PresentationConfig::default(),
    };

    let filter = args.filter_request();
    if filter.is_iv() && (filter.stages.is_empty() || filter.samples.is_empty()) {
        bail!("--spec iv requires at least one --stage and one --sample");
    }

    let tables = table::load_tables(&args.tables)?;
    let catalog = Catalog::build(tables);

    let columns = select::select(&filter, catalog.records(), &config);
    let matrix = matrix::assemble(&columns, &config.variable_order(), filter.is_iv());
    info!(
        columns = matrix.width(),
        rows = matrix.rows.len(),
        "comparison matrix ready"
    );

    let include_standard_errors = !args.no_standard_errors;
    match args.format {
        OutputFormat::Json => {
            let mut output = JsonOutput::new(&filter, &matrix);
            if args.diagnostics {
                output.set_diagnostics(&catalog);
            }
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => {
            if args.diagnostics {
                print_diagnostics(&catalog);
            }
            print!("{}", CsvOutput::new(&matrix, include_standard_errors).to_csv());
        }
        OutputFormat::Text => {
            if args.diagnostics {
                print_diagnostics(&catalog);
            }
            print!("{}", text_output::render(&matrix, include_standard_errors));
        }
    }

    Ok(())
}
