//! CLI tool to filter and rewrite CSV files by column name.
//!
//! Usage:
//!   csv-filter [input.csv] -r 'WHERE score > 10' -r 'DROP score'
//!   csv-filter input.csv -f rules.txt -o output.csv
//!
//! Reads stdin when no input is given and writes stdout when no output is
//! given. See `filtercsv::rules` for the rule syntax.

use clap::Parser;
use filtercsv::{Dialect, Rule, compile, parse_rules, process_csv};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Keep columns, keep rows and rewrite fields of a CSV file, by column name.
///
/// The first record of the input is the header; column names must be unique.
#[derive(Parser)]
#[command(name = "csv-filter")]
struct Cli {
    /// Input CSV file (stdin when omitted)
    input: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rule to apply, e.g. "WHERE score >= 15" (repeatable)
    #[arg(short = 'r', long = "rule", value_name = "RULE")]
    rules: Vec<String>,

    /// File of rules, one per line, applied before --rule rules
    #[arg(short = 'f', long)]
    rules_file: Option<PathBuf>,

    /// Field delimiter: a single byte, or "\t" / "tab"
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Trim whitespace around every field
    #[arg(long)]
    trim: bool,

    /// Let the tokenizer accept ragged records (width is still checked
    /// against the header)
    #[arg(long)]
    flexible: bool,

    /// Show paths, rule count and record counts on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    if s == "\\t" || s.eq_ignore_ascii_case("tab") {
        return Ok(b'\t');
    }
    match s.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(format!("delimiter must be a single byte, got '{s}'")),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_rules(cli: &Cli) -> Result<Vec<Rule>, String> {
    let mut rules = Vec::new();

    if let Some(path) = &cli.rules_file {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Error reading rules file '{}': {e}", path.display()))?;
        let parsed = parse_rules(&text)
            .map_err(|e| format!("Error in rules file '{}', {e}", path.display()))?;
        rules.extend(parsed);
    }

    for text in &cli.rules {
        let parsed = parse_rules(text)
            .map_err(|e| format!("Error in rule '{text}': {}", e.message))?;
        rules.extend(parsed);
    }

    Ok(rules)
}

/// `err` followed by each of its causes, separated by ": ".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdout().lock()));
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(Box::new(File::create(path)?))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rules = match load_rules(&cli) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let input = match open_input(cli.input.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            let name = cli.input.as_deref().unwrap_or(Path::new("(stdin)"));
            eprintln!("Error opening input file '{}': {e}", name.display());
            process::exit(1);
        }
    };

    let output = match open_output(cli.output.as_deref()) {
        Ok(output) => output,
        Err(e) => {
            let name = cli.output.as_deref().unwrap_or(Path::new("(stdout)"));
            eprintln!("Error opening output file '{}': {e}", name.display());
            process::exit(1);
        }
    };

    if cli.verbose {
        let show = |p: Option<&Path>, fallback: &str| {
            p.map(|p| p.display().to_string())
                .unwrap_or_else(|| fallback.to_string())
        };
        eprintln!("Input:    {}", show(cli.input.as_deref(), "(stdin)"));
        eprintln!("Output:   {}", show(cli.output.as_deref(), "(stdout)"));
        eprintln!("Rules:    {}", rules.len());
    }

    let dialect = Dialect::default()
        .with_delimiter(cli.delimiter)
        .with_trim(cli.trim)
        .with_flexible(cli.flexible);
    let mut config = compile(&rules);

    match process_csv(input, output, &dialect, &mut config) {
        Ok(summary) => {
            if cli.verbose {
                eprintln!(
                    "Columns:  {} in -> {} out",
                    summary.columns_read, summary.columns_kept
                );
                eprintln!(
                    "Records:  {} in -> {} out",
                    summary.rows_read, summary.rows_written
                );
            }
        }
        Err(e) => {
            eprintln!("Filter error: {}", error_chain(&e));
            process::exit(1);
        }
    }
}
