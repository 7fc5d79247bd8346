use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

use bucketlist::client::Session;
use bucketlist::config::ClientConfig;
use bucketlist::core::category::Category;
use bucketlist::core::form::NewItemForm;
use bucketlist::core::item::ItemId;
use bucketlist::core::state::Effect;
use bucketlist::core::view::{ListView, UiEvent};

#[derive(Parser)]
#[command(name = "bucketlist", version, about = "Track your bucket list")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an item
    Add {
        title: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Local date and time, e.g. 2026-03-01T18:30. Defaults to now.
        #[arg(short, long)]
        scheduled: Option<String>,
        /// Leave the item unscheduled
        #[arg(long, conflicts_with = "scheduled")]
        unscheduled: bool,
        /// Who added it (defaults to the configured user)
        #[arg(long)]
        by: Option<String>,
    },
    /// Show all items
    List,
    /// Flip an item between done and not done
    Toggle { id: ItemId },
    /// Delete an item
    Delete {
        id: ItemId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Write all items to a CSV file
    Export {
        #[arg(short, long, default_value = "bucket_list.csv")]
        output: PathBuf,
    },
    /// Show the rows in the remote CSV
    Pull,
    /// Re-send items whose remote save failed
    Retry,
    /// List the known categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ClientConfig::default_path);
    let config = ClientConfig::load(&config_path)?;
    bucketlist::logging::init("bucketlist", config.debug_logging);

    let mut session = Session::open(&config)?;

    match cli.command {
        Command::Add {
            title,
            category,
            description,
            scheduled,
            unscheduled,
            by,
        } => {
            let now = Utc::now();
            let mut form = NewItemForm::fresh(now, session.offset(), by.as_deref().unwrap_or(&config.user));
            form.title = title;
            form.category = category;
            form.description = description;
            if unscheduled {
                form.scheduled.clear();
            } else if let Some(s) = scheduled {
                form.scheduled = s;
            }
            let effects = session.submit(&mut form, now).await?;
            report(&effects);
        }
        Command::List => print_list(&session.render()),
        Command::Toggle { id } => {
            let effects = session.handle(id, UiEvent::Toggle, true)?;
            report(&effects);
        }
        Command::Delete { id, yes } => {
            if !yes {
                println!("Are you sure you want to delete this item? Re-run with --yes to confirm.");
                return Ok(());
            }
            let effects = session.handle(id, UiEvent::Delete, true)?;
            report(&effects);
        }
        Command::Export { output } => {
            let csv = session.export_csv()?;
            std::fs::write(&output, csv)?;
            println!("Wrote {}", output.display());
        }
        Command::Pull => {
            let rows = session.pull().await?;
            let caps = session.remote_capabilities().await?;
            if !caps.update || !caps.delete {
                println!("Note: the remote CSV only records new items; completions and deletions stay local.");
            }
            if rows.is_empty() {
                println!("Remote CSV is empty or missing.");
            }
            for row in rows {
                let mark = if row.completed { "x" } else { " " };
                println!("[{}] {} ({}) by {} at {}", mark, row.title, row.category, row.created_by, row.created_at);
            }
        }
        Command::Retry => {
            let effects = session.retry_failed().await?;
            if effects.is_empty() {
                println!("Nothing to retry.");
            }
            report(&effects);
        }
        Command::Categories => {
            for c in Category::ALL {
                println!("{} {}", c.icon(), c.as_key());
            }
        }
    }

    Ok(())
}

fn report(effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Notify(msg) => println!("{}", msg),
            Effect::Celebrate(_) => println!("🎊 Completed!"),
            Effect::Diverged(id) => log::info!("Item {} diverged from remote CSV", id),
        }
    }
}

fn print_list(view: &ListView) {
    if view.empty {
        println!("Your bucket list is empty. Add something with `bucketlist add`.");
        return;
    }
    println!("{}", view.count_label);
    for card in &view.cards {
        let mark = if card.completed { "x" } else { " " };
        println!("[{}] {} {} {} ({})", mark, card.id, card.icon, card.title, card.sync_label);
        if let Some(ref description) = card.description {
            println!("      {}", description);
        }
        let mut meta = format!("      Created: {}", card.created);
        if let Some(ref scheduled) = card.scheduled {
            meta.push_str(&format!(" · Scheduled: {}", scheduled));
        }
        meta.push_str(&format!(" · By: {}", card.created_by));
        println!("{}", meta);
    }
}
