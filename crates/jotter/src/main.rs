//! `jot` - CLI for jotter
//!
//! Adds messages to the log and shows what has been recorded so far.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use jotter::cli::{
    render_record, render_records, AddCommand, Cli, Command, ConfigCommand, ListCommand,
};
use jotter::{init_logging, Config, RecordStore, SqliteStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Runs before loading so a broken config file can still be located and checked.
    if !cli.needs_config() {
        if let Command::Config(cmd) = &cli.command {
            return handle_config_file(cmd, cli.config.as_deref());
        }
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(ConfigCommand::Show { json }) => handle_show_config(&config, json),
        Command::Config(cmd) => handle_config_file(&cmd, cli.config.as_deref()),
    }
}

fn open_store(config: &Config) -> anyhow::Result<RecordStore<SqliteStore>> {
    let path = config.database_path();
    let backend = SqliteStore::open(&path)
        .with_context(|| format!("opening storage at {}", path.display()))?;
    let store = RecordStore::open(backend)?;

    for diagnostic in store.diagnostics() {
        eprintln!("warning: skipped unreadable record ({diagnostic})");
    }
    Ok(store)
}

fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    store.subscribe(|records| debug!("Log now holds {} records", records.len()));

    let record = store.add(cmd.message.unwrap_or_default())?;
    println!("{}", render_record(&record, cmd.json, config)?);
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let records = store.list();
    let shown = match cmd.last {
        Some(n) => &records[records.len().saturating_sub(n)..],
        None => records,
    };

    let rendered = render_records(shown, cmd.format, config)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let summary = store.summary();
    let stats = store.backend().stats()?;
    let skipped: Vec<String> = store.diagnostics().iter().map(ToString::to_string).collect();

    if json {
        let status = serde_json::json!({
            "database_path": store.backend().path(),
            "database_size_bytes": stats.db_size_bytes,
            "total_records": summary.total_records,
            "oldest_record": summary.oldest,
            "newest_record": summary.newest,
            "skipped_entries": skipped,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let stamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(|| "-".to_string(), |t| config.format_timestamp(t))
        };
        println!("jot status");
        println!("----------");
        println!("Database:      {}", store.backend().path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Records:       {}", summary.total_records);
        println!("Oldest:        {}", stamp(summary.oldest));
        println!("Newest:        {}", stamp(summary.newest));
        if !skipped.is_empty() {
            println!("Skipped:       {}", skipped.len());
            for entry in &skipped {
                println!("  {entry}");
            }
        }
    }
    Ok(())
}

fn handle_show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", config.database_path().display());
        println!();
        println!("[Display]");
        println!("  Timestamp format:   {}", config.display.timestamp_format);
        println!("  Local time:         {}", config.display.local_time);
    }
    Ok(())
}

fn handle_config_file(cmd: &ConfigCommand, config_path: Option<&Path>) -> anyhow::Result<()> {
    let in_effect = || config_path.map_or_else(Config::default_config_path, Path::to_path_buf);

    match cmd {
        ConfigCommand::Path => {
            println!("{}", in_effect().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(in_effect);
            println!("Validating configuration: {}", path.display());
            Config::check_file(&path)
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
        ConfigCommand::Show { .. } => {
            anyhow::bail!("`config show` needs a loaded configuration");
        }
    }
    Ok(())
}
