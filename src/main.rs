use anyhow::Context;
use clap::{Parser, Subcommand};
use safeinc::{
    config::Config,
    inline::{Inliner, StderrSink},
    logging, path,
    reader::{AllowList, SafeReader},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "safeinc", version, about = "Allow-listed file reads and @import inlining")]
struct Cli {
    /// TOML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inline every @import reachable from FILE
    Inline {
        file: String,
        #[arg(long)]
        base_dir: Option<String>,
        /// Directory reads may come from (repeatable)
        #[arg(long = "allow")]
        allow: Vec<String>,
        #[arg(long)]
        max_depth: Option<usize>,
        /// Print the processed document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a file if the allow-list permits it
    Read {
        path: String,
        #[arg(long = "allow")]
        allow: Vec<String>,
    },
    /// Join and normalize path segments
    Join { segments: Vec<String> },
    /// Exit 0 if PATH lies within DIR
    Contains { path: String, dir: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(p) => Config::load(p).with_context(|| format!("loading config {}", p.display()))?,
        None => Config::default(),
    };
    logging::init(cfg.logging.json);

    match cli.command {
        Command::Inline { file, base_dir, allow, max_depth, json } => {
            if let Some(dir) = base_dir { cfg.inline.base_dir = dir; }
            if !allow.is_empty() { cfg.inline.allowed_dirs = allow; }
            if let Some(depth) = max_depth { cfg.inline.max_depth = depth; }
            cfg.validate().context("validating config")?;

            let allow = AllowList::new(&cfg.inline.allowed_dirs);
            let doc = Inliner::new()
                .sink(StderrSink)
                .max_depth(cfg.inline.max_depth)
                .inline(&file, &cfg.inline.base_dir, &allow)
                .await
                .with_context(|| format!("inlining {file}"))?;
            info!(file = %file, imported = ?doc.imported_files, "done");
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", doc.content);
            }
        }
        Command::Read { path, allow } => {
            let dirs = if allow.is_empty() { cfg.inline.allowed_dirs } else { allow };
            let content = SafeReader::new()
                .read(&path, &AllowList::new(&dirs))
                .await
                .with_context(|| format!("reading {path}"))?;
            print!("{content}");
        }
        Command::Join { segments } => {
            println!("{}", path::normalize_join(&segments));
        }
        Command::Contains { path: candidate, dir } => {
            let inside = path::is_contained(&path::normalize(&candidate), &path::normalize(&dir));
            println!("{inside}");
            if !inside {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
