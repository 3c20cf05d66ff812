//! Command-line front end for the item list.
//!
//! # Responsibility
//! - Drive `ItemListController` the way a UI would: dispatch intents and
//!   render the snapshots the store publishes back.
//! - Keep a `ping` probe to verify core linkage without touching storage.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use itemlist_core::{
    init_logging, Item, ItemId, ItemListController, ItemListReceiver, ItemSnapshot, ItemStore,
    LogLevel, LoggingConfig, StoreConfig,
};
use log::{error, info, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::time::timeout;

const WRITE_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "itemlist", version, about = "Persisted list of named items")]
struct Cli {
    /// Directory holding the `items_database` file.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core version and exit.
    Ping,
    /// Print all items.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add an item with the given name.
    Add { name: String },
    /// Remove the item with the given id.
    Remove { id: ItemId },
    /// Read `add <name>`, `remove <id>`, `list`, `quit` from stdin.
    Shell,
}

#[derive(Debug, PartialEq, Eq)]
enum Intent {
    Add(String),
    Remove(ItemId),
    List,
    Quit,
    Empty,
}

impl Command {
    /// Stable command name used in `event=cli_<name>` log lines.
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Shell => "shell",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let command = cli.command.name();
    let started_at = Instant::now();
    info!("event=cli_{command} module=cli status=start");

    let result = run(cli).await;
    match &result {
        Ok(()) => info!(
            "event=cli_{command} module=cli status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=cli_{command} module=cli status=error duration_ms={} error={err:#}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ping => {
            println!("itemlist_core ping={}", itemlist_core::ping());
            println!("itemlist_core version={}", itemlist_core::core_version());
            Ok(())
        }
        Command::List { json } => {
            let controller = open_controller(&cli.data_dir)?;
            let items = controller.current_items();
            if json {
                println!("{}", serde_json::to_string_pretty(items.as_slice())?);
            } else {
                render(&items);
            }
            Ok(())
        }
        Command::Add { name } => add(open_controller(&cli.data_dir)?, name).await,
        Command::Remove { id } => remove(open_controller(&cli.data_dir)?, id).await,
        Command::Shell => shell(open_controller(&cli.data_dir)?).await,
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let level = match &cli.log_level {
        Some(level) => level.parse::<LogLevel>()?,
        None => LogLevel::build_default(),
    };
    init_logging(&LoggingConfig::new(level, log_dir.clone()))?;
    Ok(())
}

fn open_controller(data_dir: &Path) -> Result<ItemListController> {
    let store = ItemStore::open(&StoreConfig::in_dir(data_dir))
        .inspect_err(|err| {
            error!(
                "event=cli_open module=cli status=error error_code=store_open_failed error={err}"
            )
        })
        .with_context(|| format!("failed to open item store in `{}`", data_dir.display()))?;
    Ok(ItemListController::new(Arc::new(store), Handle::current()))
}

async fn add(controller: ItemListController, name: String) -> Result<()> {
    let mut list = controller.items();
    let last_id = list.borrow().last().map(|item| item.id);

    controller.add_item(name);
    let snapshot = wait_for(&mut list, |items| {
        items.last().map(|item| item.id) != last_id
    })
    .await?;

    if let Some(item) = snapshot.last() {
        println!("added #{} {}", item.id, item.name);
    }
    Ok(())
}

async fn remove(controller: ItemListController, id: ItemId) -> Result<()> {
    let Some(item) = find_item(&controller.current_items(), id) else {
        bail!("no item with id {id}");
    };
    let mut list = controller.items();

    controller.remove_item(item.clone());
    wait_for(&mut list, |items| items.iter().all(|it| it.id != id)).await?;

    println!("removed #{} {}", item.id, item.name);
    Ok(())
}

async fn shell(controller: ItemListController) -> Result<()> {
    let mut list = controller.items();
    let printer = tokio::spawn(async move {
        while list.changed().await.is_ok() {
            let snapshot = list.borrow_and_update().clone();
            render(&snapshot);
        }
    });

    render(&controller.current_items());
    let controller = tokio::task::spawn_blocking(move || {
        read_intents(&controller).map(|()| controller)
    })
    .await
    .context("input thread panicked")??;

    let pending = controller.pending_writes();
    timeout(WRITE_WAIT, controller.settled())
        .await
        .inspect_err(|_| {
            warn!("event=cli_shell module=cli status=error error_code=write_timeout pending={pending}")
        })
        .context("timed out waiting for queued writes")?;

    // Dropping the last store handle closes the list; the printer drains it and stops.
    drop(controller);
    timeout(WRITE_WAIT, printer)
        .await
        .context("timed out flushing item list output")?
        .context("output task panicked")?;
    Ok(())
}

fn read_intents(controller: &ItemListController) -> Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match parse_intent(&line) {
            Ok(Intent::Add(name)) => controller.add_item(name),
            Ok(Intent::Remove(id)) => match find_item(&controller.current_items(), id) {
                Some(item) => controller.remove_item(item),
                None => eprintln!("no item with id {id}"),
            },
            Ok(Intent::List) => render(&controller.current_items()),
            Ok(Intent::Quit) => break,
            Ok(Intent::Empty) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
    Ok(())
}

fn parse_intent(line: &str) -> Result<Intent, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match verb {
        "" => Ok(Intent::Empty),
        "add" => Ok(Intent::Add(rest.to_string())),
        "remove" | "rm" => rest
            .parse::<ItemId>()
            .map(Intent::Remove)
            .map_err(|_| format!("expected an item id, got `{rest}`")),
        "list" | "ls" => Ok(Intent::List),
        "quit" | "exit" => Ok(Intent::Quit),
        other => Err(format!(
            "unknown command `{other}`; expected add|remove|list|quit"
        )),
    }
}

async fn wait_for(
    list: &mut ItemListReceiver,
    done: impl FnMut(&ItemSnapshot) -> bool,
) -> Result<ItemSnapshot> {
    let snapshot = timeout(WRITE_WAIT, list.wait_for(done))
        .await
        .inspect_err(|_| {
            warn!("event=cli_wait module=cli status=error error_code=write_timeout")
        })
        .context("timed out waiting for the item list to update")?
        .context("item store closed")?
        .clone();
    Ok(snapshot)
}

fn find_item(items: &[Item], id: ItemId) -> Option<Item> {
    items.iter().find(|item| item.id == id).cloned()
}

fn render(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    for item in items {
        println!("#{} {}", item.id, item.name);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_intent, Cli, Intent};
    use clap::Parser;

    #[test]
    fn command_names_match_log_events() {
        let names: Vec<&str> = [
            vec!["itemlist", "ping"],
            vec!["itemlist", "list", "--json"],
            vec!["itemlist", "add", "Milk"],
            vec!["itemlist", "remove", "7"],
            vec!["itemlist", "--data-dir", "/tmp", "shell"],
        ]
        .into_iter()
        .map(|args| Cli::try_parse_from(args).unwrap().command.name())
        .collect();
        assert_eq!(names, ["ping", "list", "add", "remove", "shell"]);
    }

    #[test]
    fn parse_intent_reads_add_with_spaces() {
        assert_eq!(
            parse_intent("  add  oat milk "),
            Ok(Intent::Add("oat milk".to_string()))
        );
        assert_eq!(parse_intent("add"), Ok(Intent::Add(String::new())));
    }

    #[test]
    fn parse_intent_reads_remove_id() {
        assert_eq!(parse_intent("rm 42"), Ok(Intent::Remove(42)));
        assert!(parse_intent("remove milk").is_err());
    }

    #[test]
    fn parse_intent_handles_control_words() {
        assert_eq!(parse_intent(""), Ok(Intent::Empty));
        assert_eq!(parse_intent("ls"), Ok(Intent::List));
        assert_eq!(parse_intent("exit"), Ok(Intent::Quit));
        assert!(parse_intent("fly").is_err());
    }
}
