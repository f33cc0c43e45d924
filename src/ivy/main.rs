use clap::Parser;
use colored::*;
use ivy::error::{IvyError, Result};
use ivy::{Database, FieldValue};
use log::LevelFilter;
use serde_json::Value;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db = Database::open_with_file_config(&cli.root)?;

    let outcome = match cli.command {
        Commands::Tables => handle_tables(&db),
        Commands::Ids { table } => handle_ids(&db, &table),
        Commands::Show { table, id } => handle_show(&db, &table, &id),
        Commands::Find {
            table,
            field,
            value,
            all,
            string,
        } => handle_find(&db, &table, &field, &value, all, string),
        Commands::Tags { table, tags } => handle_tags(&db, &table, &tags),
        Commands::Delete { table, id } => handle_delete(&db, &table, &id),
        Commands::Reindex { table } => handle_reindex(&db, &table),
    };

    db.close();
    outcome
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_ids(ids: &[String]) {
    if ids.is_empty() {
        eprintln!("{}", "No matching records".yellow());
    }
    for id in ids {
        println!("{}", id);
    }
}

fn handle_tables(db: &Database) -> Result<()> {
    for table in db.tables() {
        if db.is_tag_indexed(&table)? {
            println!("{} {}", table, "(tags)".dimmed());
        } else {
            println!("{}", table);
        }
    }
    Ok(())
}

fn handle_ids(db: &Database, table: &str) -> Result<()> {
    print_ids(&db.find_all_ids(table)?);
    Ok(())
}

fn handle_show(db: &Database, table: &str, id: &str) -> Result<()> {
    let doc: Value = db.find(table, id)?;
    let pretty = serde_json::to_string_pretty(&doc).map_err(IvyError::Serialization)?;
    println!("{}", pretty);
    Ok(())
}

/// Integers compare as integers unless `--string` is given.
fn parse_value(raw: &str, force_string: bool) -> FieldValue {
    if !force_string {
        if let Ok(n) = raw.parse::<i64>() {
            return FieldValue::Int(n);
        }
    }
    FieldValue::from(raw)
}

fn handle_find(
    db: &Database,
    table: &str,
    field: &str,
    raw: &str,
    all: bool,
    force_string: bool,
) -> Result<()> {
    let value = parse_value(raw, force_string);
    let ids = if all {
        db.find_all_ids_for_field(table, field, value)?
    } else {
        db.find_first_id_for_field(table, field, value)?
            .into_iter()
            .collect()
    };
    print_ids(&ids);
    Ok(())
}

fn handle_tags(db: &Database, table: &str, tags: &[String]) -> Result<()> {
    print_ids(&db.find_all_ids_for_tags(table, tags)?);
    Ok(())
}

fn handle_delete(db: &Database, table: &str, id: &str) -> Result<()> {
    db.delete(table, id)?;
    println!("{} {}/{}", "Deleted".green(), table, id);
    Ok(())
}

fn handle_reindex(db: &Database, table: &str) -> Result<()> {
    db.reindex(table)?;
    let count = db.find_all_ids(table)?.len();
    println!("{} {} ({} records)", "Reindexed".green(), table, count);
    Ok(())
}
