//! tabledef - parse MariaDB `SHOW CREATE TABLE` output from the command line
//!
//! Reads one statement per file (stdin when no file is given), parses it
//! and prints the result as JSON, as tables, or as a regenerated CREATE
//! TABLE script.
//!
//! ```text
//! mariadb -N -e 'SHOW CREATE TABLE shop.orders' | cut -f2 | tabledef --schema shop
//! tabledef --schema shop --format table orders.sql users.sql
//! ```

mod logging;
mod output;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tabledef_parser::{ParseOptions, ParseOutput, ParsedTable, TableParser, link_references};
use tracing::{info, warn};

use crate::logging::LoggingConfig;
use crate::output::OutputFormat;
use crate::settings::Settings;

/// Parse MariaDB SHOW CREATE TABLE output
#[derive(Parser, Debug)]
#[command(name = "tabledef", version, about)]
struct Cli {
    /// Schema the tables belong to
    #[arg(short, long, env = "TABLEDEF_SCHEMA")]
    schema: Option<String>,

    /// Settings file (default: <config dir>/tabledef/settings.json)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Give the table, its columns and its keys generated ids
    #[arg(long)]
    auto_gen_id: bool,

    /// Keep column charsets that repeat the table charset
    #[arg(long)]
    keep_col_charset: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Exit with an error when a definition is not recognized or a table
    /// fails validation
    #[arg(long)]
    strict: bool,

    /// Files holding one CREATE TABLE statement each; stdin when omitted
    files: Vec<PathBuf>,
}

impl Cli {
    /// Parse options from settings, overridden by flags
    fn parse_options(&self, settings: &Settings) -> ParseOptions {
        ParseOptions {
            auto_gen_id: self.auto_gen_id || settings.parse.auto_gen_id,
            skip_col_charset_if_equal: settings.parse.skip_col_charset_if_equal
                && !self.keep_col_charset,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load settings from {}", path.display()),
        None => "Failed to load settings".to_string(),
    })?;
    logging::init(&LoggingConfig::from_settings(&settings))?;

    let schema = cli
        .schema
        .clone()
        .or_else(|| settings.default_schema.clone())
        .context("No schema given; pass --schema or set default_schema in the settings")?;
    let options = cli.parse_options(&settings);
    let format = cli.format.unwrap_or(settings.output);

    let parser = TableParser::new(options);
    let mut outputs = Vec::new();
    for (source, ddl) in read_inputs(&cli.files)? {
        let output = parser
            .parse(&ddl, &schema)
            .with_context(|| format!("Failed to parse {source}"))?;
        for warning in &output.warnings {
            warn!(source = %source, "{warning}");
        }
        outputs.push(output);
    }

    if options.auto_gen_id {
        link_all(&mut outputs);
    }

    let findings = count_findings(&outputs);
    info!(tables = outputs.len(), findings, "parsed input");

    println!("{}", output::render(&outputs, format)?);

    if cli.strict && findings > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// `(source name, content)` for every file, or for stdin
fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if files.is_empty() {
        let mut ddl = String::new();
        std::io::stdin()
            .read_to_string(&mut ddl)
            .context("Failed to read stdin")?;
        return Ok(vec![("<stdin>".to_string(), ddl)]);
    }

    files
        .iter()
        .map(|path| {
            let ddl = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((path.display().to_string(), ddl))
        })
        .collect()
}

/// Resolve foreign keys between all parsed tables
fn link_all(outputs: &mut [ParseOutput]) {
    let lookup: Vec<ParsedTable> = outputs.iter().map(|o| o.table.clone()).collect();
    for output in outputs {
        link_references(&mut output.table, &lookup);
    }
}

/// Unrecognized definitions plus validation errors, each logged
fn count_findings(outputs: &[ParseOutput]) -> usize {
    let mut findings = 0;
    for output in outputs {
        findings += output.warnings.len();
        for error in output.table.validate() {
            warn!(table = %output.table.qualified_name(), "{error}");
            findings += 1;
        }
    }
    findings
}
