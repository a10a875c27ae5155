//! checkdb - run SQL scripts against an in-memory engine with CHECK constraints

use anyhow::{Context, Result};
use checkdb::access::Value;
use checkdb::database::{Database, QueryResult};
use checkdb::sql::split_statements;
use clap::Parser as ClapParser;
use std::io::Read;
use std::path::PathBuf;

/// checkdb - SQL with CHECK constraints
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQL script to run (reads stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the physical plan of each query before running it
    #[arg(short, long)]
    explain: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let script = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .context("Failed to read stdin")?;
            script
        }
    };

    let database = Database::new();
    let mut failures = 0;
    for statement in split_statements(&script) {
        if args.explain && is_query(&statement) {
            match database.explain(&statement) {
                Ok(plan) => println!("{}", plan),
                Err(e) => log::warn!("cannot explain: {}", e),
            }
        }

        match database.execute(&statement) {
            Ok(result) => print_result(&result),
            Err(e) => {
                failures += 1;
                eprintln!("ERROR: {:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} statement(s) failed", failures);
    }
    Ok(())
}

fn is_query(statement: &str) -> bool {
    statement
        .trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

fn print_result(result: &QueryResult) {
    match result {
        QueryResult::Rows { columns, rows } => {
            println!("{}", columns.join(" | "));
            for row in rows {
                let cells: Vec<String> = row.iter().map(render).collect();
                println!("{}", cells.join(" | "));
            }
            println!("({} rows)", rows.len());
        }
        QueryResult::Count(count) => println!("OK {}", count),
        QueryResult::Ok => println!("OK"),
    }
}

/// Render values the way psql does: strings unquoted, NULL empty
fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
