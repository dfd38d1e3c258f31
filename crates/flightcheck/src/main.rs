//! `flightcheck` - CLI for aviation procedure checklists
//!
//! This binary opens the local store, dispatches one command and exits.
//! Progress and settings survive between runs unless `--ephemeral` is given.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use flightcheck::cli::{
    ChecklistCommand, Cli, Command, ConfigCommand, CurrentCommand, ResetCommand, SettingsCommand,
    ToggleCommand,
};
use flightcheck::{
    init_logging, ActiveChecklist, ChecklistId, ChecklistRecord, Config, KeyValueStore,
    MemoryStore, RecordStore, SettingsPatch, SettingsStore, SqliteStore,
};

/// Terminal bell, rung when an item is checked and sound is enabled.
const BELL: &str = "\x07";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Status(status_cmd) => handle_status(&config, cli.ephemeral, status_cmd.json).await,
        Command::Checklist(checklist_cmd) => {
            if cli.ephemeral {
                info!("Using in-memory store; nothing will be saved");
                dispatch(Arc::new(MemoryStore::new()), &config, checklist_cmd).await
            } else {
                let store = open_store(&config)?;
                dispatch(Arc::new(store), &config, checklist_cmd).await
            }
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    debug!("Opening store at {}", path.display());
    SqliteStore::open_configured(&config.storage)
        .with_context(|| format!("could not open checklist store at {}", path.display()))
}

async fn dispatch<S: KeyValueStore>(
    store: Arc<S>,
    config: &Config,
    cmd: ChecklistCommand,
) -> anyhow::Result<()> {
    let mut records = RecordStore::new(Arc::clone(&store));
    let mut settings = SettingsStore::new(store);

    match cmd {
        ChecklistCommand::List(list_cmd) => handle_list(&records, list_cmd.json).await,
        ChecklistCommand::Show(show_cmd) => {
            handle_show(&mut records, show_cmd.checklist.into(), show_cmd.json).await
        }
        ChecklistCommand::Toggle(toggle_cmd) => {
            handle_toggle(&mut records, &mut settings, &toggle_cmd).await
        }
        ChecklistCommand::Reset(reset_cmd) => handle_reset(&mut records, config, &reset_cmd).await,
        ChecklistCommand::Current(current_cmd) => {
            handle_current(&mut records, config, current_cmd).await
        }
        ChecklistCommand::Clear(clear_cmd) => handle_clear(&mut records, config, clear_cmd.yes).await,
        ChecklistCommand::Settings(settings_cmd) => {
            handle_settings(&mut settings, settings_cmd).await
        }
    }
}

async fn handle_list<S: KeyValueStore>(
    records: &RecordStore<S>,
    json: bool,
) -> anyhow::Result<()> {
    let overview = records.list_all_progress().await?;

    if json {
        let entries: Vec<serde_json::Value> = overview
            .iter()
            .map(|(id, summary)| {
                serde_json::json!({
                    "id": id,
                    "title": id.definition().title,
                    "progress": summary.progress,
                    "completed": summary.completed,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Checklists");
        println!("==========");
        for (id, summary) in &overview {
            let mark = if summary.completed { "done" } else { "" };
            println!(
                "  {:<14} {:<28} {:>3}%  {}",
                id.as_str(),
                id.definition().title,
                summary.progress,
                mark
            );
        }
    }
    Ok(())
}

async fn handle_show<S: KeyValueStore>(
    records: &mut RecordStore<S>,
    id: ChecklistId,
    json: bool,
) -> anyhow::Result<()> {
    let record = records.load_or_create(id).await?;
    print_record(&record, json)
}

async fn handle_toggle<S: KeyValueStore>(
    records: &mut RecordStore<S>,
    settings: &mut SettingsStore<S>,
    cmd: &ToggleCommand,
) -> anyhow::Result<()> {
    let id = ChecklistId::from(cmd.checklist);
    let index = cmd.index();
    let prefs = settings.load().await?;

    records.load_or_create(id).await?;
    let update = records.toggle(id, index).await?;

    if update.item_completed(index) == Some(true) && prefs.sound_enabled && !cmd.json {
        print!("{BELL}");
        std::io::stdout().flush()?;
    }

    if cmd.json {
        return print_record(&update.record, true);
    }

    if let Some(item) = update.record.items.get(index) {
        println!("{}. {} {}", cmd.item, checkbox(item.completed), item.text);
    }
    println!("{}: {}", update.record.title, update.counts());
    if update.counts().is_complete() {
        println!("Checklist complete!");
    }
    Ok(())
}

async fn handle_reset<S: KeyValueStore>(
    records: &mut RecordStore<S>,
    config: &Config,
    cmd: &ResetCommand,
) -> anyhow::Result<()> {
    let id = ChecklistId::from(cmd.checklist);
    if !confirmed(config, cmd.yes) {
        println!(
            "This will uncheck every item of \"{}\".",
            id.definition().title
        );
        println!("Use --yes to confirm.");
        return Ok(());
    }

    records.load_or_create(id).await?;
    let update = records.reset(id).await?;
    println!("{}: {}", update.record.title, update.counts());
    Ok(())
}

async fn handle_current<S: KeyValueStore>(
    records: &mut RecordStore<S>,
    config: &Config,
    cmd: CurrentCommand,
) -> anyhow::Result<()> {
    match cmd {
        CurrentCommand::Show { json } => match records.resume().await? {
            Some(active) => print_active(&active, json)?,
            None if json => println!("null"),
            None => {
                println!("No checklist in progress.");
                println!("Open one with `flightcheck show <checklist>`.");
            }
        },
        CurrentCommand::Reset { yes } => {
            if !confirmed(config, yes) {
                println!("This will uncheck every item of the current checklist.");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            match records.reset_active().await? {
                Some(update) => println!("{}: {}", update.record.title, update.counts()),
                None => println!("No checklist in progress."),
            }
        }
    }
    Ok(())
}

async fn handle_clear<S: KeyValueStore>(
    records: &mut RecordStore<S>,
    config: &Config,
    yes: bool,
) -> anyhow::Result<()> {
    if !confirmed(config, yes) {
        println!("This will delete the progress of every checklist.");
        println!("Settings are kept. Use --yes to confirm.");
        return Ok(());
    }

    let removed = records.clear_all().await?;
    println!("Removed {removed} checklist record(s).");
    Ok(())
}

async fn handle_settings<S: KeyValueStore>(
    settings: &mut SettingsStore<S>,
    cmd: SettingsCommand,
) -> anyhow::Result<()> {
    let current = settings.load().await?;

    let (shown, json) = match cmd {
        SettingsCommand::Show { json } => (current, json),
        SettingsCommand::Set { dark_mode, sound } => {
            let patch = SettingsPatch {
                dark_mode,
                sound_enabled: sound,
            };
            if patch.is_empty() {
                println!("Nothing to change. Use --dark-mode or --sound.");
                (current, false)
            } else {
                (settings.update(patch).await?, false)
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        println!("Settings");
        println!("========");
        println!("  Dark mode:  {}", on_off(shown.dark_mode));
        println!("  Sound:      {}", on_off(shown.sound_enabled));
    }
    Ok(())
}

async fn handle_status(config: &Config, ephemeral: bool, json: bool) -> anyhow::Result<()> {
    if ephemeral {
        if json {
            let status = serde_json::json!({ "storage": "memory" });
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!("flightcheck status");
            println!("------------------");
            println!("Storage:       in memory (nothing is saved)");
        }
        return Ok(());
    }

    let store = Arc::new(open_store(config)?);
    let stats = store.stats().await?;
    let mut records = RecordStore::new(Arc::clone(&store));
    let active = records.resume().await?;

    if json {
        let status = serde_json::json!({
            "storage": "sqlite",
            "database_path": store.path(),
            "total_keys": stats.total_keys,
            "record_count": stats.record_count,
            "last_updated": stats.last_updated.map(|t| t.to_rfc3339()),
            "db_size_bytes": stats.db_size_bytes,
            "current": active.as_ref().map(|a| serde_json::json!({
                "id": a.id,
                "title": a.title,
                "progress": a.progress().percent,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("flightcheck status");
        println!("------------------");
        println!("Database:      {}", store.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Records:       {}", stats.record_count);
        println!("Keys:          {}", stats.total_keys);
        match stats.last_updated {
            Some(t) => println!("Last updated:  {}", t.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("Last updated:  never"),
        }
        match &active {
            Some(a) => println!("Current:       {} {}", a.title, a.progress()),
            None => println!("Current:       none"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
                println!("  WAL enabled:        {}", config.storage.wal_enabled);
                println!();
                println!("[Checklist]");
                println!("  Confirm reset:      {}", config.checklist.confirm_reset);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_record(record: &ChecklistRecord, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "id": record.id,
            "title": record.title,
            "items": record.items,
            "progress": record.progress(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", record.title);
    println!("{}", record.progress());
    println!();
    for (i, item) in record.items.iter().enumerate() {
        println!("  {:>2}. {} {}", i + 1, checkbox(item.completed), item.text);
    }
    if !record.matches_definition(record.id.definition()) {
        println!();
        println!("Note: this checklist was started before its steps were updated.");
        println!("Run `flightcheck clear` to start over with the current steps.");
    }
    if record.progress().is_complete() {
        println!();
        println!("Checklist complete!");
    }
    Ok(())
}

fn print_active(active: &ActiveChecklist, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(active)?);
        return Ok(());
    }

    println!("{}", active.title);
    println!("{}", active.progress());
    println!();
    for (i, item) in active.items.iter().enumerate() {
        println!("  {:>2}. {} {}", i + 1, checkbox(item.completed), item.text);
    }
    Ok(())
}

fn confirmed(config: &Config, yes: bool) -> bool {
    yes || !config.checklist.confirm_reset
}

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
