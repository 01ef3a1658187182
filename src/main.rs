//! Graft CLI
//!
//! Usage:
//!   graft [OPTIONS] [GRAPH]
//!
//! Options:
//!   -d, --data <FILE>          JSON data to render against
//!   -p, --partial <NAME=FILE>  Register a partial graph (repeatable)
//!   -c, --config <FILE>        Render configuration (TOML format)
//!   -f, --format <FORMAT>      Output format: html, tree, fragment
//!   -w, --wrap [TAG]           Wrap the output in TAG (default: the configured wrap tag)
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use graft::graph::wire;
use graft::{PartialRegistry, RenderConfig, Template};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Tree,
    Fragment,
}

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Render compiled template graphs against JSON data")]
struct Cli {
    /// Graph file (reads from stdin if not provided)
    graph: Option<PathBuf>,

    /// JSON data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Partial graph to register, as NAME=FILE
    #[arg(short, long, value_parser = parse_partial)]
    partial: Vec<(String, PathBuf)>,

    /// Render configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Wrap the output in TAG, or in the configured wrap tag when TAG is omitted
    #[arg(short, long, value_name = "TAG", num_args = 0..=1)]
    wrap: Option<Option<String>>,
}

fn parse_partial(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=FILE, got '{}'", arg)),
    }
}

fn fail(message: String) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn read_data(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading data file '{}': {}", path.display(), e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| fail(format!("parsing data file '{}': {}", path.display(), e)))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RenderConfig::from_file(path)
            .unwrap_or_else(|e| fail(format!("loading config '{}': {}", path.display(), e))),
        None => RenderConfig::default(),
    };

    let compiled = match &cli.graph {
        Some(path) => wire::from_file(path),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                fail(format!("reading from stdin: {}", e));
            }
            wire::from_str(&buffer)
        }
    }
    .unwrap_or_else(|e| fail(e.to_string()));

    let registry = PartialRegistry::global();
    for (name, path) in &cli.partial {
        let partial = wire::from_file(path).unwrap_or_else(|e| fail(e.to_string()));
        registry.register(
            name.as_str(),
            Template::from_compiled(partial).with_registry(registry.clone()),
        );
    }

    let data = cli.data.as_deref().map(read_data).unwrap_or(Value::Null);

    let mut template = Template::from_compiled(compiled)
        .with_registry(registry)
        .with_config(config);
    match cli.wrap.as_ref() {
        Some(Some(tag)) => template = template.wrap(tag),
        Some(None) => template = template.wrap_default(),
        None => {}
    }

    match cli.format {
        Format::Html => println!("{}", template.to_html(&data)),
        Format::Fragment => {
            let fragment = template.to_fragment(&data);
            println!("{}", fragment.to_html_with(template.config()));
        }
        Format::Tree => match serde_json::to_string_pretty(&template.to_tree(&data).to_json()) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e.to_string()),
        },
    }
}
