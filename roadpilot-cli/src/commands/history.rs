//! History command - list or clear recent destinations.

use console::style;
use dialoguer::Confirm;
use roadpilot::config::ConfigFile;
use roadpilot::history::{HistoryEntry, HistoryStore};

use crate::error::CliError;

pub struct HistoryArgs {
    pub clear: bool,
    pub yes: bool,
}

/// Run the history command.
pub fn run(args: HistoryArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let store = config.history_store();

    if args.clear {
        return run_clear(store.as_ref(), args.yes);
    }

    let entries = store.entries()?;
    if entries.is_empty() {
        println!("No destinations yet.");
        return Ok(());
    }

    println!("Recent destinations");
    println!("===================");
    println!();
    for (i, entry) in entries.iter().enumerate() {
        println!("{}", format_entry(i + 1, entry));
    }
    Ok(())
}

fn run_clear(store: &dyn HistoryStore, yes: bool) -> Result<(), CliError> {
    if !yes {
        if !console::user_attended() {
            return Err(CliError::Input(
                "refusing to clear history without confirmation; pass --yes".to_string(),
            ));
        }
        let confirmed = Confirm::new()
            .with_prompt("Clear all destination history?")
            .default(false)
            .interact()
            .map_err(|e| CliError::Input(e.to_string()))?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear()?;
    println!("History cleared.");
    Ok(())
}

fn format_entry(index: usize, entry: &HistoryEntry) -> String {
    format!(
        "{:>2}. {:<30} {}  {}",
        index,
        entry.name,
        style(&entry.display_date).dim(),
        entry.position()
    )
}
