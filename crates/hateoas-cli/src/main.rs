mod cmd_negotiate;
mod cmd_paginate;
mod cmd_render;
mod cmd_validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hateoas::v1::Document;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hateoas")]
#[command(about = "Validate, negotiate, and render hypermedia resource documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log negotiation and pagination decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Negotiate a media type and render a document with it
    Render {
        /// Input file (omit or use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accept header value
        #[arg(long)]
        accept: Option<String>,

        /// Format override (json, hal, html, ...)
        #[arg(long)]
        format: Option<String>,

        /// Page title for HTML output
        #[arg(long)]
        title: Option<String>,

        /// Leave the raw JSON block out of HTML output
        #[arg(long)]
        no_raw_json: bool,
    },
    /// Print the media type a request would be served with
    Negotiate {
        /// Accept header value
        #[arg(long)]
        accept: Option<String>,

        /// Format override (json, hal, html, ...)
        #[arg(long)]
        format: Option<String>,

        /// Restrict the offered media types (repeatable)
        #[arg(long = "offer")]
        offers: Vec<String>,
    },
    /// Validate a resource or collection document
    Validate {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print an empty collection with pagination links
    Paginate {
        /// Base URL the links are derived from
        #[arg(long)]
        base: String,

        /// Current page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Items per page
        #[arg(long, default_value_t = hateoas::v1::DEFAULT_PAGE_SIZE)]
        page_size: u64,

        /// Total number of items
        #[arg(long)]
        total: u64,

        /// Name of the embedded item list
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            accept,
            format,
            title,
            no_raw_json,
        } => cmd_render::run(cmd_render::RenderArgs {
            input,
            output,
            accept,
            format,
            title,
            include_raw_json: !no_raw_json,
            pretty: cli.pretty,
        }),
        Commands::Negotiate {
            accept,
            format,
            offers,
        } => cmd_negotiate::run(accept, format, offers),
        Commands::Validate { input } => cmd_validate::run(input),
        Commands::Paginate {
            base,
            page,
            page_size,
            total,
            name,
        } => cmd_paginate::run(&base, page, page_size, total, name, cli.pretty),
    }
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a document from `path`, or stdin when `path` is absent or `-`.
pub(crate) fn read_doc(path: Option<&Path>) -> Result<Document> {
    let content = match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("Failed to read {:?}", p))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let source = path.map_or_else(|| "stdin".to_string(), |p| format!("{:?}", p));
    Document::from_json(&content).with_context(|| format!("Failed to parse {}", source))
}
