// ABOUTME: CLI for curio: splits extracts, parses rendered HTML and queries the cache-backed pipeline.
// ABOUTME: Local files/stdin are parsed offline; page commands go through the MediaWiki API and print JSON.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use curio_pipeline::{
    ArticleKey, CacheOptions, CacheStore, MemoryStore, Pipeline, SqliteStore, WikiClient,
    DEFAULT_API_URL,
};
use curio_wiki::{parse_page_html, split_sections, OutlineEntry};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Extract structured data from Wikipedia articles and print JSON.
#[derive(Parser, Debug)]
#[command(name = "curio")]
#[command(about = "Extract sections, citations, links and images from Wikipedia articles", long_about = None)]
struct Args {
    /// SQLite cache file. An in-memory cache is used when omitted.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// MediaWiki action API endpoint.
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a plaintext extract into summary and sections.
    Sections {
        /// File path, or "-" for stdin.
        input: String,
    },
    /// Run every HTML pass over rendered article HTML.
    Parse {
        /// File path, or "-" for stdin.
        input: String,
        /// JSON file holding the section outline ([{title, level, index}]).
        #[arg(long)]
        outline: Option<PathBuf>,
    },
    /// Fetch an article's plaintext and split it into sections.
    Article {
        page_id: Option<String>,
        #[arg(long, conflicts_with = "page_id")]
        title: Option<String>,
    },
    /// Parsed page data (link counts, citations, images), cache-backed.
    Page { page_id: String },
    /// Linked articles of one section, or of the lead when no section is given.
    Links {
        page_id: String,
        #[arg(long)]
        section: Option<String>,
    },
    /// Citations referenced from one section, or from the lead.
    Citations {
        page_id: String,
        #[arg(long)]
        section: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Command::Sections { input } => {
            let text = read_input(input)?;
            print_json(&split_sections(&text), args.compact)
        }
        Command::Parse { input, outline } => {
            let html = read_input(input)?;
            let outline = match outline {
                Some(path) => load_outline(path)?,
                None => Vec::new(),
            };
            print_json(&parse_page_html(&html, &outline), args.compact)
        }
        Command::Article { page_id, title } => {
            let key = match (page_id, title) {
                (Some(id), None) => ArticleKey::page_id(id.as_str()),
                (None, Some(title)) => ArticleKey::title(title.as_str()),
                _ => bail!("provide a page id or --title"),
            };
            let article = build_pipeline(&args)?.load_article(&key)?;
            print_json(&article, args.compact)
        }
        Command::Page { page_id } => {
            let data = build_pipeline(&args)?.parsed_page_data(page_id)?;
            print_json(&data, args.compact)
        }
        Command::Links { page_id, section } => {
            let links = build_pipeline(&args)?.section_links(page_id, section.as_deref())?;
            print_json(&links, args.compact)
        }
        Command::Citations { page_id, section } => {
            let citations = build_pipeline(&args)?.section_citations(page_id, section.as_deref())?;
            print_json(&citations, args.compact)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_pipeline(args: &Args) -> Result<Pipeline> {
    let client = WikiClient::builder().api_url(args.api_url.as_str()).build()?;
    let store: Arc<dyn CacheStore> = match &args.db {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(Pipeline::new(Arc::new(client), store, CacheOptions::default()))
}

fn read_input(target: &str) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    fs::read_to_string(&path).with_context(|| format!("reading {}", target))
}

fn load_outline(path: &Path) -> Result<Vec<OutlineEntry>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing outline {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}
