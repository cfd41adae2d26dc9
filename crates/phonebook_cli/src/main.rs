//! Command-line front end for the phonebook core.
//!
//! # Responsibility
//! - Drive repository operations from a terminal.
//! - Print snapshots as JSON for scripting and quick local checks.

use clap::{Parser, Subcommand};
use log::info;
use phonebook_core::db::open_db;
use phonebook_core::{core_version, init_from_config, Color, CoreConfig, Note, Repository, Tag};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "phonebook", version, about = "Keep short contact notes in a local database")]
struct Cli {
    /// Database file; overrides PHONEBOOK_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes (active by default).
    List {
        #[arg(long)]
        trash: bool,
    },
    /// Save a new note.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        color: Option<i64>,
        #[arg(long)]
        tag: Option<i64>,
    },
    /// Move a note to the trash.
    Trash { id: i64 },
    Colors,
    Tags,
    /// Print the core version.
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Version = cli.command {
        println!("phonebook_core version={}", core_version());
        return Ok(());
    }

    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_from_config(&config)?;
    info!("event=cli_start module=cli status=ok");

    let (repo, init) = Repository::start(open_db(&config.db_path)?)?;
    init.wait().await?;

    match cli.command {
        Command::List { trash } => {
            let notes = if trash {
                repo.trashed_notes().borrow().clone()
            } else {
                repo.active_notes().borrow().clone()
            };
            println!("{}", serde_json::to_string_pretty(&notes)?);
        }
        Command::Add {
            title,
            content,
            color,
            tag,
        } => {
            let color = pick_color(&repo, color).await?;
            let tag = pick_tag(&repo, tag).await?;
            let id = repo
                .insert_note(Note::new(title, content, color, tag))
                .await?;
            println!("{}", serde_json::json!({ "id": id }));
        }
        Command::Trash { id } => {
            repo.move_note_to_trash(id).await?;
            println!("{}", serde_json::json!({ "trashed": id }));
        }
        Command::Colors => {
            println!("{}", serde_json::to_string_pretty(&all_colors(&repo).await?)?);
        }
        Command::Tags => {
            println!("{}", serde_json::to_string_pretty(&all_tags(&repo).await?)?);
        }
        Command::Version => {}
    }

    Ok(())
}

async fn all_colors(repo: &Repository) -> Result<Vec<Color>, Box<dyn Error>> {
    // Initialization always republishes the feed, so one change arrives
    // even when the table is empty.
    let mut colors = repo.colors();
    colors.changed().await?;
    let colors = colors.borrow_and_update().clone();
    Ok(colors)
}

async fn all_tags(repo: &Repository) -> Result<Vec<Tag>, Box<dyn Error>> {
    let mut tags = repo.tags();
    tags.changed().await?;
    let tags = tags.borrow_and_update().clone();
    Ok(tags)
}

async fn pick_color(repo: &Repository, id: Option<i64>) -> Result<Color, Box<dyn Error>> {
    let Some(id) = id else {
        return Ok(Color::default());
    };
    all_colors(repo)
        .await?
        .into_iter()
        .find(|color| color.id == id)
        .ok_or_else(|| format!("unknown color id {id}").into())
}

async fn pick_tag(repo: &Repository, id: Option<i64>) -> Result<Tag, Box<dyn Error>> {
    let Some(id) = id else {
        return Ok(Tag::default());
    };
    all_tags(repo)
        .await?
        .into_iter()
        .find(|tag| tag.id == id)
        .ok_or_else(|| format!("unknown tag id {id}").into())
}
